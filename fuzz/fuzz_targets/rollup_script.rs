#![no_main]

//! Drives the completion rollup with arbitrary action scripts and checks
//! the coverage invariant after every step. The first byte selects the
//! assignee set; each following byte encodes (editor, requested status).

use chrono::{TimeZone, Utc};
use darkroom_core::model::{Assignment, Order, Priority, Status};
use darkroom_core::rollup::apply_editor_status_change;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

const EDITORS: [&str; 4] = ["a", "b", "c", "d"];

fuzz_target!(|data: &[u8]| {
    let Some((&header, script)) = data.split_first() else {
        return;
    };

    let mut assignees = BTreeSet::new();
    for (bit, editor) in EDITORS.iter().enumerate() {
        if header & (1 << bit) != 0 {
            assignees.insert((*editor).to_string());
        }
    }
    if assignees.is_empty() {
        return;
    }

    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut order = Order {
        id: "ord-fuzz".into(),
        customer: "Fuzz Films".into(),
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
        created_at: Some(now),
        completed_at: None,
    };

    for &byte in script {
        let editor = EDITORS[(byte & 0b11) as usize];
        let requested = match (byte >> 2) & 0b11 {
            0 => Status::Pending,
            1 => Status::InProgress,
            2 => Status::Completed,
            _ => Status::WaitingApproval,
        };
        let _ = apply_editor_status_change(&mut order, editor, requested, now);

        if order.is_shared() {
            let covered = order.completed_by.is_superset(&order.assigned_editors);
            assert_eq!(order.status == Status::Completed, covered);
            assert!(order.completed_by.is_subset(&order.assigned_editors));
        }
        assert_eq!(order.completed_at.is_some(), order.status == Status::Completed);
    }
});
