use serde::Serialize;

use tallybook_core::Money;
use tallybook_customers::CustomerRecord;
use tallybook_invoicing::{InvoiceRecord, InvoiceStatus};
use tallybook_products::ProductRecord;

/// Products with stock below this count as low-stock alerts.
pub const LOW_STOCK_THRESHOLD: u64 = 5;

/// Headline metrics for the dashboard view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    /// Sum of `total_amount` over paid invoices.
    pub total_revenue: Money,
    pub customer_count: usize,
    /// Products with `stock_quantity < LOW_STOCK_THRESHOLD`.
    pub low_stock_count: usize,
    /// Invoices awaiting payment (sent or overdue).
    pub unpaid_count: usize,
}

pub fn dashboard_metrics(
    customers: &[CustomerRecord],
    products: &[ProductRecord],
    invoices: &[InvoiceRecord],
) -> DashboardMetrics {
    let total_revenue = invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Paid)
        .fold(Money::ZERO, |sum, inv| sum.saturating_add(inv.total_amount));

    let low_stock_count = products
        .iter()
        .filter(|p| p.stock_quantity < LOW_STOCK_THRESHOLD)
        .count();

    let unpaid_count = invoices.iter().filter(|inv| inv.status.is_unpaid()).count();

    DashboardMetrics {
        total_revenue,
        customer_count: customers.len(),
        low_stock_count,
        unpaid_count,
    }
}

/// The most recently issued invoices, newest first (id tiebreak).
pub fn recent_invoices(invoices: &[InvoiceRecord], limit: usize) -> Vec<InvoiceRecord> {
    let mut sorted = invoices.to_vec();
    sorted.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.truncate(limit);
    sorted
}
