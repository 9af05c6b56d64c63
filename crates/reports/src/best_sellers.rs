use std::collections::BTreeMap;

use serde::Serialize;

use tallybook_core::Money;
use tallybook_invoicing::{InvoiceRecord, InvoiceStatus};
use tallybook_products::ProductId;

/// How many products the best-seller ranking returns.
pub const TOP_SELLER_LIMIT: usize = 5;

/// Sales accumulated for one product across all paid invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    /// Name from the line-item snapshot (first occurrence wins).
    pub name: String,
    pub units_sold: u64,
    pub revenue: Money,
}

/// Top products by units sold across all paid invoices' line items.
///
/// Sorted by units descending; ties broken by product id ascending so the
/// ranking is deterministic regardless of store iteration order.
pub fn top_selling_products(invoices: &[InvoiceRecord]) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<ProductId, ProductSales> = BTreeMap::new();

    for invoice in invoices {
        if invoice.status != InvoiceStatus::Paid {
            continue;
        }
        for line in &invoice.line_items {
            let entry = by_product
                .entry(line.product_id)
                .or_insert_with(|| ProductSales {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    units_sold: 0,
                    revenue: Money::ZERO,
                });
            entry.units_sold = entry.units_sold.saturating_add(line.quantity);
            entry.revenue = entry
                .revenue
                .saturating_add(line.price.saturating_mul_quantity(line.quantity));
        }
    }

    // BTreeMap iteration is id-ascending; the stable sort keeps that order
    // within equal unit counts.
    let mut ranked: Vec<ProductSales> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    ranked.truncate(TOP_SELLER_LIMIT);
    ranked
}
