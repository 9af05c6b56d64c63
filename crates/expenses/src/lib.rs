//! Expenses domain module.
//!
//! This crate contains business rules for expense records, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod expense;

pub use expense::{
    Expense, ExpenseCommand, ExpenseEvent, ExpenseId, ExpenseRecord, ExpenseRecorded,
    ExpenseUpdated, RecordExpense, UpdateExpense,
};
