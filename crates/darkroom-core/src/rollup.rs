//! Shared-order completion rollup.
//!
//! A shared order (more than one assigned editor) is `completed` exactly when
//! every assigned editor is present in `completed_by`. While coverage is
//! partial the order reads `in-progress`. Single-editor orders skip the
//! contribution set entirely; their `status` field is the sole source of
//! truth.
//!
//! `completed_at` is set the moment the last required contributor lands and
//! cleared whenever full coverage is lost again.
//!
//! Everything here is a pure in-memory transform; persistence and the
//! transaction wrapping live in [`crate::db::orders`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::error::ErrorCode;
use crate::model::{Order, Status};

/// What a rollup application did to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RollupOutcome {
    /// Single-editor order: the requested status was applied verbatim.
    Direct { status: Status },
    /// Shared order: the actor's completion landed but coverage is partial.
    PartiallyComplete { done: usize, total: usize },
    /// Shared order: the actor's completion closed the set.
    FullyComplete,
    /// Shared order: the actor withdrew; `status` is the resulting status.
    Regressed { status: Status },
}

/// Rejection reasons for an editor-requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    #[error("editor '{editor}' is not assigned to order '{order_id}'")]
    NotAssigned { order_id: String, editor: String },

    #[error("status '{requested}' cannot be requested by an editor")]
    UnsupportedTarget { requested: Status },
}

impl RollupError {
    /// Map this error to its stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotAssigned { .. } => ErrorCode::NotAssigned,
            Self::UnsupportedTarget { .. } => ErrorCode::UnsupportedStatusTarget,
        }
    }
}

/// Apply one editor's requested personal status change to an order.
///
/// For shared orders a `completed` request adds the actor to `completed_by`
/// (idempotently) and rolls the order up only once the set covers every
/// assignee; a regression removes the actor and keeps the order
/// `in-progress` while other contributors remain. Single-editor orders take
/// the requested status directly.
///
/// The actor must be a member of `assigned_editors`; `waiting-approval` is
/// not a requestable target (it is only entered at self-order creation).
///
/// # Errors
///
/// [`RollupError::NotAssigned`] when the actor is not an assignee,
/// [`RollupError::UnsupportedTarget`] for a `waiting-approval` request. The
/// order is untouched on error.
pub fn apply_editor_status_change(
    order: &mut Order,
    editor: &str,
    requested: Status,
    now: DateTime<Utc>,
) -> Result<RollupOutcome, RollupError> {
    if requested == Status::WaitingApproval {
        return Err(RollupError::UnsupportedTarget { requested });
    }
    if !order.assigned_editors.contains(editor) {
        return Err(RollupError::NotAssigned {
            order_id: order.id.clone(),
            editor: editor.to_string(),
        });
    }

    if !order.is_shared() {
        order.status = requested;
        order.completed_at = (requested == Status::Completed).then_some(now);
        return Ok(RollupOutcome::Direct { status: requested });
    }

    if requested == Status::Completed {
        order.completed_by.insert(editor.to_string());

        if covers_assignees(order) {
            order.status = Status::Completed;
            order.completed_at = Some(now);
            return Ok(RollupOutcome::FullyComplete);
        }

        order.status = Status::InProgress;
        order.completed_at = None;
        let (done, total) = order.completion_progress();
        return Ok(RollupOutcome::PartiallyComplete { done, total });
    }

    // Regression: withdraw the actor's contribution.
    order.completed_by.remove(editor);
    order.status = if order.completed_by.is_empty() {
        requested
    } else {
        Status::InProgress
    };
    order.completed_at = None;

    Ok(RollupOutcome::Regressed {
        status: order.status,
    })
}

/// Replace the assignee set and restore the completion invariant.
///
/// Contributions from editors no longer assigned are dropped. For the new
/// multi-editor set the status is re-derived from coverage; a formerly
/// completed order whose coverage evaporated falls back to `in-progress`.
/// With one or zero assignees the contribution set is cleared and the
/// status left alone.
pub fn reconcile_assignment(
    order: &mut Order,
    assignees: BTreeSet<String>,
    now: DateTime<Utc>,
) -> Status {
    order.assigned_editors = assignees;
    order.completed_by = order
        .completed_by
        .intersection(&order.assigned_editors)
        .cloned()
        .collect();

    if !order.is_shared() {
        order.completed_by.clear();
        return order.status;
    }

    if covers_assignees(order) {
        if order.status != Status::Completed {
            order.status = Status::Completed;
            order.completed_at = Some(order.completed_at.unwrap_or(now));
        }
    } else if order.completed_by.is_empty() {
        if order.status == Status::Completed {
            order.status = Status::InProgress;
        }
        order.completed_at = None;
    } else {
        order.status = Status::InProgress;
        order.completed_at = None;
    }

    order.status
}

fn covers_assignees(order: &Order) -> bool {
    !order.assigned_editors.is_empty() && order.completed_by.is_superset(&order.assigned_editors)
}

#[cfg(test)]
mod tests {
    use super::{RollupError, RollupOutcome, apply_editor_status_change, reconcile_assignment};
    use crate::model::{Assignment, Order, Priority, Status};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn shared_order(assigned: &[&str]) -> Order {
        Order {
            id: "ord-7".into(),
            customer: "Lensflare Films".into(),
            telecaller: "meera".into(),
            remark: String::new(),
            priority: Priority::default(),
            sample_image_url: None,
            assignment: if assigned.len() > 1 {
                Assignment::Broadcast
            } else {
                Assignment::Direct
            },
            status: Status::Pending,
            assigned_editors: names(assigned),
            completed_by: BTreeSet::new(),
            rating: None,
            pending_edit: None,
            created_at: Some(t0()),
            completed_at: None,
        }
    }

    // ===================================================================
    // Single-assignee orders
    // ===================================================================

    #[test]
    fn single_editor_takes_requested_status_directly() {
        let mut order = shared_order(&["a"]);

        let outcome = apply_editor_status_change(&mut order, "a", Status::InProgress, t0())
            .expect("assigned editor");
        assert_eq!(
            outcome,
            RollupOutcome::Direct {
                status: Status::InProgress
            }
        );
        assert_eq!(order.status, Status::InProgress);
        assert!(order.completed_at.is_none());

        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("complete");
        assert_eq!(order.status, Status::Completed);
        assert_eq!(order.completed_at, Some(t0()));
        assert!(order.completed_by.is_empty());

        // Regression clears the completion stamp.
        apply_editor_status_change(&mut order, "a", Status::Pending, t0()).expect("regress");
        assert_eq!(order.status, Status::Pending);
        assert!(order.completed_at.is_none());
    }

    // ===================================================================
    // Shared-order completion
    // ===================================================================

    #[test]
    fn two_editor_scenario_rolls_up_and_back() {
        let mut order = shared_order(&["a", "b"]);

        // A completes: partial coverage.
        let outcome = apply_editor_status_change(&mut order, "a", Status::Completed, t0())
            .expect("a completes");
        assert_eq!(outcome, RollupOutcome::PartiallyComplete { done: 1, total: 2 });
        assert_eq!(order.status, Status::InProgress);
        assert_eq!(order.completed_by, names(&["a"]));
        assert!(order.completed_at.is_none());

        // B completes: full coverage.
        let outcome = apply_editor_status_change(&mut order, "b", Status::Completed, t0())
            .expect("b completes");
        assert_eq!(outcome, RollupOutcome::FullyComplete);
        assert_eq!(order.status, Status::Completed);
        assert_eq!(order.completed_by, names(&["a", "b"]));
        assert_eq!(order.completed_at, Some(t0()));

        // A withdraws: B's contribution keeps the order in-progress.
        let outcome = apply_editor_status_change(&mut order, "a", Status::InProgress, t0())
            .expect("a regresses");
        assert_eq!(
            outcome,
            RollupOutcome::Regressed {
                status: Status::InProgress
            }
        );
        assert_eq!(order.completed_by, names(&["b"]));
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn completion_is_idempotent_per_editor() {
        let mut order = shared_order(&["a", "b"]);

        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("first");
        let snapshot = order.clone();
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("second");

        assert_eq!(order.completed_by, snapshot.completed_by);
        assert_eq!(order.status, snapshot.status);
        assert_eq!(order.completed_at, snapshot.completed_at);
    }

    #[test]
    fn regression_to_pending_with_no_other_contributors() {
        let mut order = shared_order(&["a", "b"]);
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("complete");
        apply_editor_status_change(&mut order, "a", Status::Pending, t0()).expect("withdraw");

        assert_eq!(order.status, Status::Pending);
        assert!(order.completed_by.is_empty());
    }

    #[test]
    fn invariant_holds_across_arbitrary_call_sequences() {
        let editors = ["a", "b", "c"];
        let mut order = shared_order(&editors);

        let script: &[(&str, Status)] = &[
            ("a", Status::Completed),
            ("b", Status::Completed),
            ("a", Status::InProgress),
            ("c", Status::Completed),
            ("a", Status::Completed),
            ("b", Status::Pending),
            ("b", Status::Completed),
        ];

        for (editor, requested) in script {
            apply_editor_status_change(&mut order, editor, *requested, t0()).expect("assigned");

            let covered = order.completed_by.is_superset(&order.assigned_editors);
            assert_eq!(
                order.status == Status::Completed,
                covered,
                "completed iff covered after {editor} -> {requested}"
            );
            assert_eq!(order.completed_at.is_some(), order.status == Status::Completed);
        }

        assert_eq!(order.status, Status::Completed);
    }

    // ===================================================================
    // Preconditions
    // ===================================================================

    #[test]
    fn unassigned_editor_is_refused() {
        let mut order = shared_order(&["a", "b"]);
        let before = order.clone();

        let err = apply_editor_status_change(&mut order, "mallory", Status::Completed, t0())
            .expect_err("not assigned");
        assert!(matches!(err, RollupError::NotAssigned { .. }));
        assert_eq!(err.code(), crate::error::ErrorCode::NotAssigned);
        assert_eq!(order, before, "order untouched on refusal");
    }

    #[test]
    fn waiting_approval_is_not_a_valid_target() {
        let mut order = shared_order(&["a"]);
        let err = apply_editor_status_change(&mut order, "a", Status::WaitingApproval, t0())
            .expect_err("unsupported");
        assert!(matches!(err, RollupError::UnsupportedTarget { .. }));
        assert_eq!(err.code(), crate::error::ErrorCode::UnsupportedStatusTarget);
    }

    // ===================================================================
    // Reassignment reconciliation
    // ===================================================================

    #[test]
    fn reassignment_drops_stale_contributions() {
        let mut order = shared_order(&["a", "b"]);
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("a done");

        // Swap a out for c: a's contribution must not linger.
        let status = reconcile_assignment(&mut order, names(&["b", "c"]), t0());
        assert_eq!(status, Status::InProgress);
        assert!(order.completed_by.is_empty());
    }

    #[test]
    fn reassignment_can_complete_an_order() {
        let mut order = shared_order(&["a", "b", "c"]);
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("a done");
        apply_editor_status_change(&mut order, "b", Status::Completed, t0()).expect("b done");
        assert_eq!(order.status, Status::InProgress);

        // Dropping the straggler leaves full coverage among the remainder.
        let status = reconcile_assignment(&mut order, names(&["a", "b"]), t0());
        assert_eq!(status, Status::Completed);
        assert_eq!(order.completed_at, Some(t0()));
    }

    #[test]
    fn reassignment_away_from_full_coverage_reopens() {
        let mut order = shared_order(&["a", "b"]);
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("a done");
        apply_editor_status_change(&mut order, "b", Status::Completed, t0()).expect("b done");
        assert_eq!(order.status, Status::Completed);

        let status = reconcile_assignment(&mut order, names(&["a", "b", "c"]), t0());
        assert_eq!(status, Status::InProgress);
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn shrinking_to_one_editor_clears_contribution_set() {
        let mut order = shared_order(&["a", "b"]);
        apply_editor_status_change(&mut order, "a", Status::Completed, t0()).expect("a done");

        let status = reconcile_assignment(&mut order, names(&["a"]), t0());
        assert_eq!(status, Status::InProgress);
        assert!(order.completed_by.is_empty());
        assert!(!order.is_shared());
    }
}
