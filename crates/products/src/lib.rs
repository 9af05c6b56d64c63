//! Products domain module (catalog + stock).
//!
//! This crate contains business rules for products, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Stock lives on the
//! product record; deductions clamp at zero.

pub mod product;

pub use product::{
    AddProduct, DeductStock, Product, ProductAdded, ProductCommand, ProductEvent, ProductId,
    ProductRecord, ProductUpdated, StockDeducted, UpdateProduct,
};
