//! Operation payloads submitted by the UI layer.
//!
//! Identifiers and creation timestamps are minted by the service, not supplied
//! by the caller.

use serde::{Deserialize, Serialize};

use tallybook_core::{Money, Timestamp};
use tallybook_customers::CustomerId;
use tallybook_invoicing::{InvoiceStatus, LineItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub date: Timestamp,
    pub category: String,
    pub description: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub customer_id: CustomerId,
    pub line_items: Vec<LineItem>,
    /// Caller-computed total; verified against the line items at creation.
    pub total_amount: Money,
    pub status: InvoiceStatus,
    pub due_date: Timestamp,
}
