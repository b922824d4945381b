//! The dashboard page, its aggregation queries, and the chart JSON API.

mod chart_endpoint;
mod handlers;
mod stats;

pub use chart_endpoint::{ChartData, get_spending_by_category};
pub use handlers::get_dashboard_page;
pub use stats::{
    BreakdownEntry, MonthlySummary, NO_TOP_CATEGORY_LABEL, UNCATEGORIZED_LABEL, monthly_summary,
    spending_by_category,
};
