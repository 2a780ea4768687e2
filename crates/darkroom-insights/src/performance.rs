//! Performance aggregations: top performer, monthly charts, turnaround.
//!
//! Completion attribution is the per-editor test from the core model
//! throughout, so a contributor on a shared order earns credit the moment
//! their own part lands.

use chrono::{DateTime, Datelike, Utc};
use darkroom_core::model::{Editor, Order, month_key};
use serde::Serialize;

use crate::targets::completed_in_month;

/// How many completions the activity feed shows.
const RECENT_LIMIT: usize = 5;

/// The month's strongest contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPerformer {
    pub editor_id: String,
    pub name: String,
    pub completed: usize,
}

/// One month of an editor's performance chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthPerformance {
    /// Calendar month, 1-12.
    pub month: u32,
    /// Orders created for this editor in the month.
    pub assigned: usize,
    /// Orders whose completion landed in the month.
    pub completed: usize,
    /// Mean hours from creation to completion, one decimal place.
    pub avg_turnaround_hours: Option<f64>,
}

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The editor with the strict maximum of completions attributed to the
/// month containing `now`.
///
/// Ties go to whoever appears first in the roster, and nobody wins a month
/// without completions.
#[must_use]
pub fn top_performer(
    orders: &[Order],
    roster: &[Editor],
    now: DateTime<Utc>,
) -> Option<TopPerformer> {
    let month = month_key(now);
    let mut best: Option<TopPerformer> = None;

    for editor in roster {
        let completed = completed_in_month(orders, &editor.id, &month);
        if completed > best.as_ref().map_or(0, |b| b.completed) {
            best = Some(TopPerformer {
                editor_id: editor.id.clone(),
                name: editor.name.clone(),
                completed,
            });
        }
    }

    best
}

/// Twelve months of assigned/completed/turnaround for one editor.
///
/// Assignments bucket by creation month, completions by completion month;
/// the two deliberately differ so a long-running order shows up where the
/// work actually finished.
#[must_use]
pub fn monthly_performance(orders: &[Order], editor_id: &str, year: i32) -> Vec<MonthPerformance> {
    (1..=12)
        .map(|month| {
            let mut assigned = 0;
            let mut completed = 0;
            let mut turnaround_hours = Vec::new();

            for order in orders {
                if !order.assigned_editors.contains(editor_id) {
                    continue;
                }
                if let Some(created) = order.created_at {
                    if created.year() == year && created.month() == month {
                        assigned += 1;
                    }
                }
                if !order.counts_completed_for(editor_id) {
                    continue;
                }
                if let Some(done) = order.completed_at {
                    if done.year() == year && done.month() == month {
                        completed += 1;
                        if let Some(hours) = turnaround_for(order) {
                            turnaround_hours.push(hours);
                        }
                    }
                }
            }

            MonthPerformance {
                month,
                assigned,
                completed,
                avg_turnaround_hours: mean(&turnaround_hours).map(round1),
            }
        })
        .collect()
}

/// Mean hours from creation to completion over every order this editor has
/// completion credit for, one decimal place. `None` without any finished
/// order carrying both stamps.
#[must_use]
pub fn average_turnaround_hours(orders: &[Order], editor_id: &str) -> Option<f64> {
    let hours: Vec<f64> = orders
        .iter()
        .filter(|order| order.counts_completed_for(editor_id))
        .filter_map(turnaround_for)
        .collect();

    mean(&hours).map(round1)
}

/// The editor's most recent completions, newest first, capped at five.
///
/// Only fully completed orders carry a completion stamp, so a pending
/// contribution to a shared order does not appear here yet.
#[must_use]
pub fn recent_completions<'a>(orders: &'a [Order], editor_id: &str) -> Vec<&'a Order> {
    let mut done: Vec<&Order> = orders
        .iter()
        .filter(|order| order.counts_completed_for(editor_id))
        .filter(|order| order.completed_at.is_some())
        .collect();

    done.sort_by_key(|order| std::cmp::Reverse(order.completed_at));
    done.truncate(RECENT_LIMIT);
    done
}

#[allow(clippy::cast_precision_loss)]
fn turnaround_for(order: &Order) -> Option<f64> {
    let created = order.created_at?;
    let done = order.completed_at?;
    let seconds = (done - created).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some(seconds as f64 / 3600.0)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
