//! Weekly completion-ratio trend per editor.
//!
//! Orders bucket by the ISO week of their creation stamp. The ratio is
//! completed over assigned within the bucket, rounded to two decimal places
//! for the chart tooltips.

use chrono::Datelike;
use darkroom_core::model::Order;
use serde::Serialize;
use std::collections::BTreeMap;

/// One point on an editor's weekly trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekPoint {
    /// ISO week-numbering year (differs from the calendar year around
    /// January 1st).
    pub iso_year: i32,
    pub iso_week: u32,
    pub assigned: usize,
    pub completed: usize,
    pub completion_ratio: f64,
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weekly assigned/completed counts for one editor, oldest week first.
///
/// Orders without a creation stamp are skipped; weeks with no assignments
/// simply do not appear.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weekly_trend(orders: &[Order], editor_id: &str) -> Vec<WeekPoint> {
    let mut buckets: BTreeMap<(i32, u32), (usize, usize)> = BTreeMap::new();

    for order in orders {
        if !order.assigned_editors.contains(editor_id) {
            continue;
        }
        let Some(created) = order.created_at else {
            continue;
        };
        let week = created.iso_week();
        let bucket = buckets.entry((week.year(), week.week())).or_insert((0, 0));
        bucket.0 += 1;
        if order.counts_completed_for(editor_id) {
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((iso_year, iso_week), (assigned, completed))| WeekPoint {
            iso_year,
            iso_week,
            assigned,
            completed,
            completion_ratio: if assigned == 0 {
                0.0
            } else {
                round2(completed as f64 / assigned as f64)
            },
        })
        .collect()
}
