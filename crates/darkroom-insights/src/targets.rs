//! Monthly completion targets and progress.
//!
//! A completion belongs to the calendar month the order was *created* in,
//! matching how the team plans its load: a July order finished on August 1st
//! still counts toward July's target.

use chrono::{DateTime, Utc};
use darkroom_core::model::{Editor, Order, month_key};
use serde::Serialize;

/// Progress toward one editor's target for a single month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetProgress {
    pub target: u32,
    pub completed: usize,
    /// Completed over target, clamped to `1.0`.
    pub progress: f64,
}

/// Count the completions credited to `editor_id` for the month `month`
/// (`YYYY-MM`), bucketed by each order's creation month.
#[must_use]
pub fn completed_in_month(orders: &[Order], editor_id: &str, month: &str) -> usize {
    orders
        .iter()
        .filter(|order| {
            order
                .created_at
                .is_some_and(|created| month_key(created) == month)
        })
        .filter(|order| order.counts_completed_for(editor_id))
        .count()
}

/// Progress toward `editor`'s target for the month containing `now`.
///
/// Returns `None` when no target is set for that month; the dashboard hides
/// the progress bar rather than showing a meaningless ratio.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn target_progress(orders: &[Order], editor: &Editor, now: DateTime<Utc>) -> Option<TargetProgress> {
    let target = editor.target_for(now)?;
    let completed = completed_in_month(orders, &editor.id, &month_key(now));
    let progress = (completed as f64 / f64::from(target)).min(1.0);

    Some(TargetProgress {
        target,
        completed,
        progress,
    })
}
