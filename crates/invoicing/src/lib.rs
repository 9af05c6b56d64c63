//! Invoicing domain module: the invoice lifecycle engine.
//!
//! This crate contains business rules for invoices (status transitions and
//! the paid-entry stock side effect), implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod invoice;

pub use invoice::{
    CreateInvoice, Invoice, InvoiceCommand, InvoiceCreated, InvoiceEvent, InvoiceId,
    InvoiceRecord, InvoiceStatus, LineItem, StatusChanged, StockDecrement, TransitionStatus,
};
