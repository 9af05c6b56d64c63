//! Customers domain module.
//!
//! This crate contains business rules for customer records, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::{
    Customer, CustomerCommand, CustomerEvent, CustomerId, CustomerRecord, CustomerRegistered,
    CustomerUpdated, RegisterCustomer, UpdateCustomer,
};
