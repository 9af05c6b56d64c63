use std::collections::BTreeSet;

use serde::Serialize;

use tallybook_core::Money;
use tallybook_invoicing::{InvoiceRecord, InvoiceStatus};

/// Revenue attributed to one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthRevenue {
    /// Calendar month, 1 through 12.
    pub month: u32,
    pub amount: Money,
}

/// Paid revenue per calendar month of `year`, always 12 buckets.
///
/// Attribution date is the invoice's `created_at` (issue date); the data model
/// records no separate paid-on timestamp, so revenue lands in the month the
/// invoice was issued even if payment happened later.
pub fn monthly_revenue(invoices: &[InvoiceRecord], year: i32) -> Vec<MonthRevenue> {
    let mut buckets = [Money::ZERO; 12];

    for invoice in invoices {
        if invoice.status != InvoiceStatus::Paid {
            continue;
        }
        if invoice.created_at.year() != year {
            continue;
        }
        let idx = (invoice.created_at.month() - 1) as usize;
        buckets[idx] = buckets[idx].saturating_add(invoice.total_amount);
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(idx, amount)| MonthRevenue {
            month: idx as u32 + 1,
            amount,
        })
        .collect()
}

/// Distinct invoice years, newest first; always contains `current_year`.
pub fn available_years(invoices: &[InvoiceRecord], current_year: i32) -> Vec<i32> {
    let mut years: BTreeSet<i32> = invoices.iter().map(|inv| inv.created_at.year()).collect();
    years.insert(current_year);
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tallybook_core::{RecordId, Timestamp};
    use tallybook_customers::CustomerId;
    use tallybook_invoicing::{InvoiceId, LineItem};
    use tallybook_products::ProductId;

    fn invoice(total: i64, status: InvoiceStatus, created_at: &str) -> InvoiceRecord {
        InvoiceRecord {
            id: InvoiceId::new(RecordId::new()),
            customer_id: CustomerId::new(RecordId::new()),
            line_items: vec![LineItem {
                product_id: ProductId::new(RecordId::new()),
                name: "Steel Bottle".to_string(),
                description: String::new(),
                price: Money::from_minor(total),
                quantity: 1,
            }],
            total_amount: Money::from_minor(total),
            status,
            created_at: Timestamp::from_date_str(created_at).unwrap(),
            due_date: Timestamp::from_date_str("2024-04-01").unwrap(),
        }
    }

    #[test]
    fn buckets_by_issue_month_for_paid_only() {
        let invoices = vec![
            invoice(4000, InvoiceStatus::Paid, "2024-03-15"),
            invoice(1000, InvoiceStatus::Paid, "2024-03-30"),
            invoice(2000, InvoiceStatus::Paid, "2024-11-01"),
            invoice(7777, InvoiceStatus::Sent, "2024-03-10"),
            invoice(9999, InvoiceStatus::Paid, "2023-03-10"),
        ];

        let series = monthly_revenue(&invoices, 2024);
        assert_eq!(series.len(), 12);
        assert_eq!(series[2].month, 3);
        assert_eq!(series[2].amount, Money::from_minor(5000));
        assert_eq!(series[10].amount, Money::from_minor(2000));
        assert_eq!(series[0].amount, Money::ZERO);
    }

    #[test]
    fn empty_input_yields_twelve_zero_buckets() {
        let series = monthly_revenue(&[], 2024);
        assert_eq!(series.len(), 12);
        assert!(series.iter().all(|m| m.amount == Money::ZERO));
    }

    #[test]
    fn available_years_are_distinct_and_descending() {
        let invoices = vec![
            invoice(100, InvoiceStatus::Paid, "2022-06-01"),
            invoice(100, InvoiceStatus::Draft, "2024-01-01"),
            invoice(100, InvoiceStatus::Paid, "2022-09-01"),
        ];

        assert_eq!(available_years(&invoices, 2025), vec![2025, 2024, 2022]);
        assert_eq!(available_years(&[], 2025), vec![2025]);
    }

    fn any_status() -> impl Strategy<Value = InvoiceStatus> {
        prop_oneof![
            Just(InvoiceStatus::Draft),
            Just(InvoiceStatus::Sent),
            Just(InvoiceStatus::Paid),
            Just(InvoiceStatus::Overdue),
        ]
    }

    prop_compose! {
        fn any_invoice()(
            total in 0i64..1_000_000,
            status in any_status(),
            year in 2022i32..=2025,
            month in 1u32..=12,
            day in 1u32..=28,
        ) -> InvoiceRecord {
            invoice(total, status, &format!("{year:04}-{month:02}-{day:02}"))
        }
    }

    proptest! {
        // The 12-bucket series must agree with a brute-force filter-and-sum.
        #[test]
        fn series_sums_to_brute_force_total(
            invoices in proptest::collection::vec(any_invoice(), 0..60),
            year in 2022i32..=2025,
        ) {
            let series = monthly_revenue(&invoices, year);
            let series_total = series
                .iter()
                .fold(Money::ZERO, |sum, m| sum.saturating_add(m.amount));

            let brute_force = invoices
                .iter()
                .filter(|inv| inv.status == InvoiceStatus::Paid && inv.created_at.year() == year)
                .fold(Money::ZERO, |sum, inv| sum.saturating_add(inv.total_amount));

            prop_assert_eq!(series_total, brute_force);
        }
    }
}
