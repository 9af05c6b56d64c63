//! Aggregation engine: derived, recomputable report functions.
//!
//! Every aggregate here is a pure, stateless function over the current
//! collection snapshots, recomputed from scratch on each invocation. No
//! incremental maintenance, no caching; determinism is the guarantee, with
//! explicit secondary sort keys wherever an ordering could otherwise depend on
//! store iteration order.

pub mod best_sellers;
pub mod dashboard;
pub mod profit;
pub mod revenue;

pub use best_sellers::{ProductSales, TOP_SELLER_LIMIT, top_selling_products};
pub use dashboard::{DashboardMetrics, LOW_STOCK_THRESHOLD, dashboard_metrics, recent_invoices};
pub use profit::{CategoryTotal, ProfitSummary, expense_breakdown, month_profit};
pub use revenue::{MonthRevenue, available_years, monthly_revenue};
