use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use tallybook_core::{Money, RecordId, Timestamp};
use tallybook_customers::CustomerId;
use tallybook_expenses::{ExpenseId, ExpenseRecord};
use tallybook_invoicing::{InvoiceId, InvoiceRecord, InvoiceStatus, LineItem};
use tallybook_products::ProductId;
use tallybook_reports::{
    dashboard_metrics, expense_breakdown, monthly_revenue, top_selling_products,
};

const CATEGORIES: [&str; 5] = ["Rent", "Utilities", "Travel", "Meals", "Supplies"];
const STATUSES: [InvoiceStatus; 4] = [
    InvoiceStatus::Draft,
    InvoiceStatus::Sent,
    InvoiceStatus::Paid,
    InvoiceStatus::Overdue,
];

fn synthetic_invoices(count: usize, product_pool: usize) -> Vec<InvoiceRecord> {
    let products: Vec<ProductId> = (0..product_pool)
        .map(|_| ProductId::new(RecordId::new()))
        .collect();

    (0..count)
        .map(|i| {
            let product_id = products[i % products.len()];
            let quantity = (i % 9 + 1) as u64;
            let price = Money::from_minor(((i % 50) as i64 + 1) * 100);
            let date = format!("{:04}-{:02}-{:02}", 2022 + i % 4, i % 12 + 1, i % 28 + 1);
            InvoiceRecord {
                id: InvoiceId::new(RecordId::new()),
                customer_id: CustomerId::new(RecordId::new()),
                line_items: vec![LineItem {
                    product_id,
                    name: format!("Product {}", i % products.len()),
                    description: String::new(),
                    price,
                    quantity,
                }],
                total_amount: price.saturating_mul_quantity(quantity),
                status: STATUSES[i % STATUSES.len()],
                created_at: Timestamp::from_date_str(&date).expect("valid synthetic date"),
                due_date: Timestamp::from_date_str("2024-04-01").expect("valid date"),
            }
        })
        .collect()
}

fn synthetic_expenses(count: usize) -> Vec<ExpenseRecord> {
    (0..count)
        .map(|i| {
            let date = format!("{:04}-{:02}-{:02}", 2022 + i % 4, i % 12 + 1, i % 28 + 1);
            ExpenseRecord {
                id: ExpenseId::new(RecordId::new()),
                date: Timestamp::from_date_str(&date).expect("valid synthetic date"),
                category: CATEGORIES[i % CATEGORIES.len()].to_string(),
                description: String::new(),
                amount: Money::from_minor(((i % 100) as i64 + 1) * 50),
            }
        })
        .collect()
}

/// Full-scan recompute cost as the collections grow. Every aggregate is
/// recomputed from scratch per call, so this is the per-render price the
/// dashboard pays at a given business size.
fn bench_full_scan_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan_recompute");

    for size in [100usize, 1_000, 10_000] {
        let invoices = synthetic_invoices(size, 40);
        let expenses = synthetic_expenses(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("dashboard_metrics", size), &size, |b, _| {
            b.iter(|| dashboard_metrics(black_box(&[]), black_box(&[]), black_box(&invoices)))
        });

        group.bench_with_input(BenchmarkId::new("monthly_revenue", size), &size, |b, _| {
            b.iter(|| monthly_revenue(black_box(&invoices), black_box(2024)))
        });

        group.bench_with_input(
            BenchmarkId::new("top_selling_products", size),
            &size,
            |b, _| b.iter(|| top_selling_products(black_box(&invoices))),
        );

        group.bench_with_input(
            BenchmarkId::new("expense_breakdown", size),
            &size,
            |b, _| b.iter(|| expense_breakdown(black_box(&expenses), black_box(2024), black_box(3))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_full_scan_recompute);
criterion_main!(benches);
