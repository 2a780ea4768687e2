//! Team-wide and per-editor summary cards.

use chrono::{DateTime, Datelike, Utc};
use darkroom_core::model::{Order, Status, month_key};
use serde::Serialize;

/// Order counts split by lifecycle status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub waiting_approval: usize,
}

/// The numbers on the team leader's overview cards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamSummary {
    pub total_orders: usize,
    /// Orders created in the month containing `now`.
    pub orders_this_month: usize,
    pub by_status: StatusCounts,
    /// Orders with more than one assigned editor.
    pub shared_orders: usize,
    /// Shared orders still open.
    pub shared_open: usize,
    /// All orders still open.
    pub open_orders: usize,
    /// Completed over total, as a whole percentage.
    pub completion_rate_percent: u32,
}

/// Lifetime and current-month numbers for one editor's home screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditorMonthlySummary {
    pub assigned_total: usize,
    pub completed_total: usize,
    pub month_assigned: usize,
    pub month_completed: usize,
    pub month_in_progress: usize,
}

/// Reduce the whole order list to the overview card numbers.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn team_summary(orders: &[Order], now: DateTime<Utc>) -> TeamSummary {
    let month = month_key(now);
    let mut summary = TeamSummary {
        total_orders: orders.len(),
        ..TeamSummary::default()
    };

    for order in orders {
        match order.status {
            Status::Pending => summary.by_status.pending += 1,
            Status::InProgress => summary.by_status.in_progress += 1,
            Status::Completed => summary.by_status.completed += 1,
            Status::WaitingApproval => summary.by_status.waiting_approval += 1,
        }
        if order
            .created_at
            .is_some_and(|created| month_key(created) == month)
        {
            summary.orders_this_month += 1;
        }
        if order.is_shared() {
            summary.shared_orders += 1;
            if order.is_active() {
                summary.shared_open += 1;
            }
        }
        if order.is_active() {
            summary.open_orders += 1;
        }
    }

    if summary.total_orders > 0 {
        let rate =
            summary.by_status.completed as f64 / summary.total_orders as f64 * 100.0;
        summary.completion_rate_percent = rate.round() as u32;
    }

    summary
}

/// Orders created per calendar month of `year`, January first.
#[must_use]
pub fn monthly_series(orders: &[Order], year: i32) -> [usize; 12] {
    let mut series = [0usize; 12];
    for order in orders {
        let Some(created) = order.created_at else {
            continue;
        };
        if created.year() == year {
            // month0 is 0-11 by construction.
            let slot = usize::try_from(created.month0())
                .ok()
                .and_then(|index| series.get_mut(index));
            if let Some(slot) = slot {
                *slot += 1;
            }
        }
    }
    series
}

/// Lifetime plus current-month counts for one editor.
///
/// All three month counts bucket by creation month, so the cards line up
/// with the monthly target math; `month_in_progress` is what the editor
/// still sees as open among this month's orders.
#[must_use]
pub fn editor_monthly_summary(
    orders: &[Order],
    editor_id: &str,
    now: DateTime<Utc>,
) -> EditorMonthlySummary {
    let month = month_key(now);
    let mut summary = EditorMonthlySummary::default();

    for order in orders {
        if !order.assigned_editors.contains(editor_id) {
            continue;
        }
        summary.assigned_total += 1;
        let completed = order.counts_completed_for(editor_id);
        if completed {
            summary.completed_total += 1;
        }

        if !order
            .created_at
            .is_some_and(|created| month_key(created) == month)
        {
            continue;
        }
        summary.month_assigned += 1;
        if completed {
            summary.month_completed += 1;
        }
        if order.effective_status_for(editor_id) == Status::InProgress {
            summary.month_in_progress += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::{editor_monthly_summary, monthly_series, team_summary};
    use chrono::{DateTime, TimeZone, Utc};
    use darkroom_core::model::{Assignment, Order, Priority, Status};
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 4, 12, 0, 0).unwrap()
    }

    fn order(
        id: &str,
        assigned: &[&str],
        status: Status,
        created: Option<DateTime<Utc>>,
    ) -> Order {
        Order {
            id: id.into(),
            customer: "Acme Weddings".into(),
            telecaller: String::new(),
            remark: String::new(),
            priority: Priority::default(),
            sample_image_url: None,
            assignment: if assigned.len() > 1 {
                Assignment::Broadcast
            } else {
                Assignment::Direct
            },
            status,
            assigned_editors: assigned.iter().map(ToString::to_string).collect(),
            completed_by: BTreeSet::new(),
            rating: None,
            pending_edit: None,
            created_at: created,
            completed_at: None,
        }
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn team_summary_counts_everything_once() {
        let orders = vec![
            order("ord-1", &["a"], Status::Pending, Some(at(2026, 8, 1))),
            order("ord-2", &["a", "b"], Status::InProgress, Some(at(2026, 8, 2))),
            order("ord-3", &["b"], Status::Completed, Some(at(2026, 7, 20))),
            order("ord-4", &["a"], Status::WaitingApproval, Some(at(2026, 8, 3))),
            order("ord-5", &["a", "b"], Status::Completed, None),
        ];

        let summary = team_summary(&orders, now());
        assert_eq!(summary.total_orders, 5);
        assert_eq!(summary.orders_this_month, 3);
        assert_eq!(summary.by_status.pending, 1);
        assert_eq!(summary.by_status.in_progress, 1);
        assert_eq!(summary.by_status.completed, 2);
        assert_eq!(summary.by_status.waiting_approval, 1);
        assert_eq!(summary.shared_orders, 2);
        assert_eq!(summary.shared_open, 1);
        assert_eq!(summary.open_orders, 2);
        // 2 of 5 completed -> 40%.
        assert_eq!(summary.completion_rate_percent, 40);
    }

    #[test]
    fn completion_rate_rounds_to_whole_percent() {
        let orders = vec![
            order("ord-1", &["a"], Status::Completed, None),
            order("ord-2", &["a"], Status::Pending, None),
            order("ord-3", &["a"], Status::Pending, None),
        ];
        // 1 of 3 -> 33.33 -> 33.
        assert_eq!(team_summary(&orders, now()).completion_rate_percent, 33);
    }

    #[test]
    fn empty_list_is_all_zeroes() {
        let summary = team_summary(&[], now());
        assert_eq!(summary, super::TeamSummary::default());
    }

    #[test]
    fn monthly_series_buckets_by_creation_month() {
        let orders = vec![
            order("ord-1", &["a"], Status::Pending, Some(at(2026, 1, 5))),
            order("ord-2", &["a"], Status::Pending, Some(at(2026, 1, 20))),
            order("ord-3", &["a"], Status::Pending, Some(at(2026, 8, 1))),
            order("ord-4", &["a"], Status::Pending, Some(at(2025, 8, 1))),
            order("ord-5", &["a"], Status::Pending, None),
        ];

        let series = monthly_series(&orders, 2026);
        assert_eq!(series[0], 2);
        assert_eq!(series[7], 1);
        assert_eq!(series.iter().sum::<usize>(), 3);
    }

    #[test]
    fn editor_summary_splits_lifetime_and_month() {
        let mut shared = order(
            "ord-shared",
            &["a", "b"],
            Status::InProgress,
            Some(at(2026, 8, 2)),
        );
        shared.completed_by = BTreeSet::from(["a".to_string()]);

        let orders = vec![
            order("ord-old", &["a"], Status::Completed, Some(at(2026, 6, 1))),
            order("ord-open", &["a"], Status::InProgress, Some(at(2026, 8, 1))),
            shared,
            order("ord-other", &["b"], Status::Pending, Some(at(2026, 8, 1))),
        ];

        let summary = editor_monthly_summary(&orders, "a", now());
        assert_eq!(summary.assigned_total, 3);
        assert_eq!(summary.completed_total, 2);
        assert_eq!(summary.month_assigned, 2);
        assert_eq!(summary.month_completed, 1);
        // ord-open only: the shared order reads completed from a's view.
        assert_eq!(summary.month_in_progress, 1);

        let summary = editor_monthly_summary(&orders, "b", now());
        assert_eq!(summary.assigned_total, 2);
        assert_eq!(summary.completed_total, 0);
        assert_eq!(summary.month_in_progress, 1);
    }
}
