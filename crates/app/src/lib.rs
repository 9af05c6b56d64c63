//! Application service: the operation surface the UI layer invokes.
//!
//! `Backoffice` owns a record store client and the local projections. Every
//! mutation runs its command through the owning aggregate first (validation
//! errors never reach the store), then issues exactly one store call, and only
//! on confirmed success applies the resulting events to the projections.

pub mod error;
pub mod input;
pub mod service;

pub use error::{AppError, AppResult};
pub use input::{
    CustomerUpdate, ExpenseUpdate, NewCustomer, NewExpense, NewInvoice, NewProduct, ProductUpdate,
};
pub use service::Backoffice;
