//! Per-editor assignment and workload reductions.
//!
//! "Completed" here always means the per-editor completion test from the
//! core model: on a shared order an editor gets credit once their own
//! contribution landed, even while the order as a whole is still open.
//! Open counts use the editor's effective status for the same reason.

use darkroom_core::model::{Editor, Order};
use serde::Serialize;

/// Open-order thresholds behind the roster availability chips.
const BUSY_ABOVE: usize = 5;
const ACTIVE_ABOVE: usize = 2;

/// Rolled-up counts for one editor across the whole order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorWorkload {
    pub editor_id: String,
    /// Orders this editor appears on.
    pub assigned: usize,
    /// Orders this editor has completion credit for.
    pub completed: usize,
    /// Orders still pending or in progress from this editor's view.
    pub open: usize,
}

/// Coarse availability label derived from open workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Active,
    Busy,
}

impl Availability {
    /// Label for an editor carrying `open` unfinished orders.
    #[must_use]
    pub const fn for_open_count(open: usize) -> Self {
        if open > BUSY_ABOVE {
            Self::Busy
        } else if open > ACTIVE_ABOVE {
            Self::Active
        } else {
            Self::Available
        }
    }
}

/// Compute one editor's workload over the full order list.
#[must_use]
pub fn workload_for(orders: &[Order], editor_id: &str) -> EditorWorkload {
    let mut assigned = 0;
    let mut completed = 0;
    let mut open = 0;

    for order in orders {
        if !order.assigned_editors.contains(editor_id) {
            continue;
        }
        assigned += 1;
        if order.counts_completed_for(editor_id) {
            completed += 1;
        }
        if order.effective_status_for(editor_id).is_active() {
            open += 1;
        }
    }

    EditorWorkload {
        editor_id: editor_id.to_string(),
        assigned,
        completed,
        open,
    }
}

/// Workloads for a whole roster, in roster order.
#[must_use]
pub fn team_workloads(orders: &[Order], roster: &[Editor]) -> Vec<EditorWorkload> {
    roster
        .iter()
        .map(|editor| workload_for(orders, &editor.id))
        .collect()
}

/// Count the orders the whole team still has open.
///
/// `waiting-approval` orders are queued, not worked, so they do not count.
#[must_use]
pub fn open_order_count(orders: &[Order]) -> usize {
    orders.iter().filter(|order| order.is_active()).count()
}
