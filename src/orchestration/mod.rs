//! Whole-state operations built on the pure engine.

pub mod apply_rounds;
pub mod summary;

pub use apply_rounds::apply_financing_rounds;
pub use summary::{
    compute_dashboard_summary, readiness, DashboardReport, DashboardSummary, Readiness,
    TimelinePoint, Totals,
};
