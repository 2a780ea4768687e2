//! The bundled dashboard recompute.
//!
//! [`DashboardView::compute`] is the `snapshot in, view out` seam: the store
//! publishes a fresh [`Snapshot`] after every committed write, and the whole
//! dashboard is rederived from it. Nothing is incrementally maintained;
//! recomputing keeps every card consistent with every other card by
//! construction.

use chrono::{DateTime, Datelike, Utc};
use darkroom_core::config::TeamConfig;
use darkroom_core::watch::{Snapshot, SnapshotHub};
use serde::Serialize;
use tracing::debug;

use crate::overdue::{self, AgeBucket, AgeCounts};
use crate::performance::{TopPerformer, top_performer};
use crate::summary::{TeamSummary, monthly_series, team_summary};
use crate::targets::{TargetProgress, target_progress};
use crate::workload::{Availability, EditorWorkload, workload_for};

/// One overdue order on the attention list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    pub order_id: String,
    pub customer: String,
    pub days_old: i64,
    pub bucket: AgeBucket,
}

/// One roster row: workload, availability, and target progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorPanel {
    pub editor_id: String,
    pub name: String,
    pub workload: EditorWorkload,
    pub availability: Availability,
    pub target: Option<TargetProgress>,
    pub rating: Option<f64>,
}

/// Everything the team leader's dashboard renders, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub team: TeamSummary,
    pub age_counts: AgeCounts,
    /// Overdue orders, oldest first.
    pub overdue: Vec<OverdueEntry>,
    /// One panel per active editor, in roster order.
    pub editors: Vec<EditorPanel>,
    pub top_performer: Option<TopPerformer>,
    /// Orders created per month of the current year.
    pub monthly_series: [usize; 12],
}

impl DashboardView {
    /// Derive the full dashboard from one snapshot.
    #[must_use]
    pub fn compute(snapshot: &Snapshot, cfg: &TeamConfig, now: DateTime<Utc>) -> Self {
        let overdue = overdue::overdue_orders(&snapshot.orders, &cfg.overdue, now)
            .into_iter()
            .map(|(order, bucket)| OverdueEntry {
                order_id: order.id.clone(),
                customer: order.customer.clone(),
                days_old: order
                    .created_at
                    .map_or(0, |created| overdue::age_in_days(created, now)),
                bucket,
            })
            .collect();

        let editors = snapshot
            .editors
            .iter()
            .map(|editor| {
                let workload = workload_for(&snapshot.orders, &editor.id);
                let availability = Availability::for_open_count(workload.open);
                EditorPanel {
                    editor_id: editor.id.clone(),
                    name: editor.name.clone(),
                    target: target_progress(&snapshot.orders, editor, now),
                    rating: editor.rating,
                    workload,
                    availability,
                }
            })
            .collect();

        let view = Self {
            generated_at: now,
            team: team_summary(&snapshot.orders, now),
            age_counts: overdue::bucket_counts(&snapshot.orders, &cfg.overdue, now),
            overdue,
            editors,
            top_performer: top_performer(&snapshot.orders, &snapshot.editors, now),
            monthly_series: monthly_series(&snapshot.orders, now.year()),
        };

        debug!(
            orders = snapshot.orders.len(),
            editors = snapshot.editors.len(),
            overdue = view.overdue.len(),
            "dashboard recomputed"
        );
        view
    }
}

/// Wire a dashboard recompute into a snapshot hub.
///
/// Every published snapshot is reduced to a [`DashboardView`] and handed to
/// `sink`. The clock is sampled per recompute so ages stay current.
pub fn attach(
    hub: &mut SnapshotHub,
    cfg: TeamConfig,
    clock: impl darkroom_core::Clock + 'static,
    mut sink: impl FnMut(DashboardView) + 'static,
) {
    hub.subscribe(move |snapshot: &Snapshot| {
        sink(DashboardView::compute(snapshot, &cfg, clock.now()));
    });
}
