use std::collections::BTreeMap;

use serde::Serialize;

use tallybook_core::{Money, Timestamp};
use tallybook_expenses::ExpenseRecord;
use tallybook_invoicing::{InvoiceRecord, InvoiceStatus};

/// Revenue vs. expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitSummary {
    pub revenue: Money,
    pub expenses: Money,
    /// Revenue minus expenses; may be negative.
    pub profit: Money,
}

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
}

fn in_month(ts: Timestamp, year: i32, month: u32) -> bool {
    ts.year() == year && ts.month() == month
}

/// Paid revenue (by issue date) minus expense total for the given month.
pub fn month_profit(
    invoices: &[InvoiceRecord],
    expenses: &[ExpenseRecord],
    year: i32,
    month: u32,
) -> ProfitSummary {
    let revenue = invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Paid && in_month(inv.created_at, year, month))
        .fold(Money::ZERO, |sum, inv| sum.saturating_add(inv.total_amount));

    let expense_total = expenses
        .iter()
        .filter(|e| in_month(e.date, year, month))
        .fold(Money::ZERO, |sum, e| sum.saturating_add(e.amount));

    ProfitSummary {
        revenue,
        expenses: expense_total,
        profit: revenue.saturating_sub(expense_total),
    }
}

/// Per-category expense totals for the given month, largest first
/// (category-name tiebreak).
pub fn expense_breakdown(expenses: &[ExpenseRecord], year: i32, month: u32) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<String, Money> = BTreeMap::new();

    for expense in expenses {
        if !in_month(expense.date, year, month) {
            continue;
        }
        let total = by_category.entry(expense.category.clone()).or_insert(Money::ZERO);
        *total = total.saturating_add(expense.amount);
    }

    // BTreeMap iteration is name-ascending; the stable sort keeps that order
    // within equal amounts.
    let mut totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}
