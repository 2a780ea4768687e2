#![forbid(unsafe_code)]
//! darkroom-insights library.
//!
//! Pure derived views over order/roster snapshots: overdue buckets,
//! per-editor workload, monthly targets, performance trends, and the
//! bundled dashboard recompute. Nothing here holds state or performs I/O;
//! every view is a full recomputation from the snapshot it is handed, so an
//! empty or partially-loaded snapshot yields empty results rather than
//! errors.
//!
//! # Conventions
//!
//! - **Errors**: None of these functions fail; records that cannot be
//!   bucketed (e.g. a missing creation stamp) are skipped.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`).

pub mod dashboard;
pub mod overdue;
pub mod performance;
pub mod summary;
pub mod targets;
pub mod trend;
pub mod workload;

pub use dashboard::{DashboardView, EditorPanel, OverdueEntry, attach};
pub use overdue::{AgeBucket, AgeCounts, age_in_days, bucket_counts, classify, overdue_orders};
pub use performance::{
    MonthPerformance, TopPerformer, average_turnaround_hours, monthly_performance,
    recent_completions, top_performer,
};
pub use summary::{
    EditorMonthlySummary, StatusCounts, TeamSummary, editor_monthly_summary, monthly_series,
    team_summary,
};
pub use targets::{TargetProgress, completed_in_month, target_progress};
pub use trend::{WeekPoint, weekly_trend};
pub use workload::{Availability, EditorWorkload, open_order_count, team_workloads, workload_for};
