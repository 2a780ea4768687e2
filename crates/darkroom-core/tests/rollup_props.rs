//! Property tests for the shared-order completion rollup.
//!
//! The one invariant that matters: a shared order reads `completed` exactly
//! when the contribution set covers the assignee set, and `completed_at` is
//! present exactly when the order reads `completed`. These run arbitrary
//! action scripts against the rollup and check the invariant after every
//! single step.

use chrono::{DateTime, TimeZone, Utc};
use darkroom_core::model::{Assignment, Order, Priority, Status};
use darkroom_core::rollup::{apply_editor_status_change, reconcile_assignment};
use proptest::prelude::*;
use std::collections::BTreeSet;

const EDITORS: [&str; 4] = ["a", "b", "c", "d"];

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
}

fn order_with(assignees: BTreeSet<String>) -> Order {
    Order {
        id: "ord-prop".into(),
        customer: "Lensflare Films".into(),
        telecaller: String::new(),
        remark: String::new(),
        priority: Priority::default(),
        sample_image_url: None,
        assignment: if assignees.len() > 1 {
            Assignment::Broadcast
        } else {
            Assignment::Direct
        },
        status: Status::Pending,
        assigned_editors: assignees,
        completed_by: BTreeSet::new(),
        rating: None,
        pending_edit: None,
        created_at: Some(t0()),
        completed_at: None,
    }
}

fn arb_requested() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Pending),
        Just(Status::InProgress),
        Just(Status::Completed),
    ]
}

fn arb_assignees() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::sample::subsequence(EDITORS.to_vec(), 1..=EDITORS.len())
        .prop_map(|picked| picked.iter().map(ToString::to_string).collect())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    #[test]
    fn coverage_invariant_holds_after_every_action(
        assignees in arb_assignees(),
        actions in proptest::collection::vec(
            (0usize..EDITORS.len(), arb_requested()),
            0..40,
        ),
    ) {
        let mut order = order_with(assignees.clone());

        for (index, requested) in actions {
            let editor = EDITORS[index];
            let before = order.clone();
            let result = apply_editor_status_change(&mut order, editor, requested, t0());

            if assignees.contains(editor) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.is_err(), "unassigned editor must be refused");
                prop_assert_eq!(&order, &before, "refusal must not touch the order");
            }

            if order.is_shared() {
                let covered = order.completed_by.is_superset(&order.assigned_editors);
                prop_assert_eq!(
                    order.status == Status::Completed,
                    covered,
                    "completed iff contributions cover assignees"
                );
                prop_assert!(
                    order.completed_by.is_subset(&order.assigned_editors),
                    "no stray contributors"
                );
            }
            prop_assert_eq!(
                order.completed_at.is_some(),
                order.status == Status::Completed,
                "completion stamp tracks completed status"
            );
        }
    }

    #[test]
    fn repeated_completion_is_a_no_op(
        assignees in arb_assignees(),
        pick in any::<proptest::sample::Index>(),
    ) {
        let pool: Vec<String> = assignees.iter().cloned().collect();
        let editor = pick.get(&pool);
        let mut once = order_with(assignees.clone());
        apply_editor_status_change(&mut once, editor, Status::Completed, t0())
            .expect("assigned editor");

        let mut twice = order_with(assignees);
        apply_editor_status_change(&mut twice, editor, Status::Completed, t0())
            .expect("assigned editor");
        apply_editor_status_change(&mut twice, editor, Status::Completed, t0())
            .expect("assigned editor");

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn single_assignee_status_is_the_last_request(
        requests in proptest::collection::vec(arb_requested(), 1..20),
    ) {
        let mut order = order_with(BTreeSet::from(["a".to_string()]));
        for requested in &requests {
            apply_editor_status_change(&mut order, "a", *requested, t0())
                .expect("assigned editor");
        }

        let last = *requests.last().expect("at least one request");
        prop_assert_eq!(order.status, last);
        prop_assert_eq!(order.completed_at.is_some(), last == Status::Completed);
        prop_assert!(order.completed_by.is_empty(), "single orders skip the set");
    }

    #[test]
    fn reconciliation_restores_the_invariant(
        initial in arb_assignees(),
        finishers in proptest::sample::subsequence(EDITORS.to_vec(), 0..=EDITORS.len()),
        replacement in arb_assignees(),
    ) {
        let mut order = order_with(initial);

        let eligible: Vec<&str> = finishers
            .iter()
            .filter(|editor| order.assigned_editors.contains(**editor))
            .copied()
            .collect();
        for editor in eligible {
            apply_editor_status_change(&mut order, editor, Status::Completed, t0())
                .expect("assigned editor");
        }

        reconcile_assignment(&mut order, replacement.clone(), t0());

        prop_assert_eq!(&order.assigned_editors, &replacement);
        prop_assert!(order.completed_by.is_subset(&order.assigned_editors));

        if order.is_shared() {
            let covered = order.completed_by.is_superset(&order.assigned_editors);
            prop_assert_eq!(order.status == Status::Completed, covered);
            prop_assert_eq!(order.completed_at.is_some(), order.status == Status::Completed);
        } else {
            prop_assert!(order.completed_by.is_empty());
        }
    }
}
