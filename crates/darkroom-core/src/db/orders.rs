//! Order persistence and team workflows.
//!
//! Mutations follow one shape: open a transaction, load the order, transform
//! it in memory (status changes go through [`crate::rollup`]), persist, and
//! append a history entry before committing. Running the read-modify-write
//! inside a single transaction is what keeps two editors finishing a shared
//! order at the same moment from trampling each other's contribution.

use anyhow::{Context, Result, bail, ensure};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::TeamConfig;
use crate::db::{editors, history, history::HistoryAction};
use crate::error::OpsError;
use crate::model::{
    Assignment, FieldEdits, Order, PendingEdit, Priority, Status, TeamEdit,
};
use crate::rollup::{self, RollupOutcome};

/// Fields for a team-leader-created order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Caller-allocated opaque id.
    pub id: String,
    pub customer: String,
    pub telecaller: String,
    pub remark: String,
    pub priority: Priority,
    pub sample_image_url: Option<String>,
    pub assigned_editors: BTreeSet<String>,
}

/// Fields for an editor-created order.
#[derive(Debug, Clone)]
pub struct SelfOrderDraft {
    pub id: String,
    pub customer: String,
    pub telecaller: String,
    pub remark: String,
    pub priority: Priority,
    pub sample_image_url: Option<String>,
}

/// Create a team-assigned order in `pending` state.
pub fn create_order(
    conn: &mut Connection,
    new: NewOrder,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Order> {
    ensure!(
        !new.assigned_editors.is_empty(),
        "order '{}' needs at least one assigned editor",
        new.id
    );

    let order = Order {
        assignment: assignment_for(&new.assigned_editors),
        id: new.id,
        customer: new.customer,
        telecaller: new.telecaller,
        remark: new.remark,
        priority: new.priority,
        sample_image_url: new.sample_image_url,
        status: Status::Pending,
        assigned_editors: new.assigned_editors,
        completed_by: BTreeSet::new(),
        rating: None,
        pending_edit: None,
        created_at: Some(now),
        completed_at: None,
    };

    let tx = conn.transaction().context("begin create transaction")?;
    insert_order(&tx, &order)?;
    history::record(
        &tx,
        &order.id,
        HistoryAction::Created,
        actor,
        &json!({ "assignment": order.assignment, "editors": order.assigned_editors }),
        now,
    )?;
    tx.commit().context("commit create")?;

    info!(order_id = %order.id, editors = order.assigned_editors.len(), "order created");
    Ok(order)
}

/// Create an editor's own order.
///
/// Pre-approved editors (or teams running with `self_orders.auto_approve`)
/// go straight to `pending`; everyone else waits for the team leader.
pub fn submit_self_order(
    conn: &mut Connection,
    cfg: &TeamConfig,
    editor_id: &str,
    draft: SelfOrderDraft,
    now: DateTime<Utc>,
) -> Result<Order> {
    let editor = editors::get_editor(conn, editor_id)?.ok_or_else(|| OpsError::EditorNotFound {
        editor_id: editor_id.to_string(),
    })?;

    let approved = cfg.self_orders.auto_approve || editor.self_order_approved;
    let order = Order {
        id: draft.id,
        customer: draft.customer,
        telecaller: draft.telecaller,
        remark: draft.remark,
        priority: draft.priority,
        sample_image_url: draft.sample_image_url,
        assignment: Assignment::SelfAssigned,
        status: if approved {
            Status::Pending
        } else {
            Status::WaitingApproval
        },
        assigned_editors: BTreeSet::from([editor_id.to_string()]),
        completed_by: BTreeSet::new(),
        rating: None,
        pending_edit: None,
        created_at: Some(now),
        completed_at: None,
    };

    let tx = conn.transaction().context("begin self-order transaction")?;
    insert_order(&tx, &order)?;
    history::record(
        &tx,
        &order.id,
        HistoryAction::Created,
        editor_id,
        &json!({ "self_order": true, "auto_approved": approved }),
        now,
    )?;
    tx.commit().context("commit self-order")?;

    info!(order_id = %order.id, editor_id, approved, "self-order submitted");
    Ok(order)
}

/// Load a single order with its assignment and contribution sets.
pub fn get_order(conn: &Connection, order_id: &str) -> Result<Option<Order>> {
    let Some(mut order) = order_row(conn, order_id)? else {
        return Ok(None);
    };
    order.assigned_editors = edge_set(conn, SELECT_ASSIGNEES, order_id)?;
    order.completed_by = edge_set(conn, SELECT_COMPLETIONS, order_id)?;
    Ok(Some(order))
}

/// Every order, newest first; orders without a creation stamp sort last.
pub fn list_orders(conn: &Connection) -> Result<Vec<Order>> {
    let orders = order_rows(
        conn,
        "SELECT order_id, customer, telecaller, remark, priority, assignment, status,
                sample_image_url, rating, pending_edit, created_at_us, completed_at_us
         FROM orders
         ORDER BY created_at_us IS NULL, created_at_us DESC, order_id",
        params![],
    )?;
    attach_edges(conn, orders)
}

/// Orders assigned to one editor, newest first.
pub fn list_orders_for_editor(conn: &Connection, editor_id: &str) -> Result<Vec<Order>> {
    let orders = order_rows(
        conn,
        "SELECT o.order_id, o.customer, o.telecaller, o.remark, o.priority, o.assignment,
                o.status, o.sample_image_url, o.rating, o.pending_edit,
                o.created_at_us, o.completed_at_us
         FROM orders o
         JOIN order_assignees a ON a.order_id = o.order_id
         WHERE a.editor_id = ?1
         ORDER BY o.created_at_us IS NULL, o.created_at_us DESC, o.order_id",
        params![editor_id],
    )?;
    attach_edges(conn, orders)
}

/// Orders currently in `status`, newest first.
pub fn list_orders_with_status(conn: &Connection, status: Status) -> Result<Vec<Order>> {
    let orders = order_rows(
        conn,
        "SELECT order_id, customer, telecaller, remark, priority, assignment, status,
                sample_image_url, rating, pending_edit, created_at_us, completed_at_us
         FROM orders
         WHERE status = ?1
         ORDER BY created_at_us IS NULL, created_at_us DESC, order_id",
        params![status.to_string()],
    )?;
    attach_edges(conn, orders)
}

/// Apply one editor's requested personal status change and persist the
/// rollup result atomically.
pub fn save_editor_status(
    conn: &mut Connection,
    order_id: &str,
    editor: &str,
    requested: Status,
    now: DateTime<Utc>,
) -> Result<RollupOutcome> {
    let tx = conn.transaction().context("begin status transaction")?;
    let mut order = require_order(&tx, order_id)?;

    let outcome = rollup::apply_editor_status_change(&mut order, editor, requested, now)?;

    persist_order(&tx, &order)?;
    history::record(
        &tx,
        order_id,
        HistoryAction::StatusChanged,
        editor,
        &json!({ "requested": requested, "outcome": outcome }),
        now,
    )?;
    tx.commit().context("commit status change")?;

    info!(order_id, editor, %requested, "editor status change applied");
    Ok(outcome)
}

/// Apply a team-leader edit: field changes, optional reassignment, optional
/// status override.
///
/// Reassignment runs through the rollup reconciliation so stale
/// contributions never linger. A status override is a leader decision and is
/// applied verbatim, after reconciliation; on a shared order the invariant
/// re-establishes itself on the next editor action.
pub fn apply_team_edit(
    conn: &mut Connection,
    order_id: &str,
    edit: &TeamEdit,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Order> {
    let tx = conn.transaction().context("begin edit transaction")?;
    let mut order = require_order(&tx, order_id)?;

    edit.fields.apply_to(&mut order);

    if let Some(assignees) = &edit.assigned_editors {
        if *assignees != order.assigned_editors {
            ensure!(
                !assignees.is_empty(),
                "cannot reassign order '{order_id}' to nobody"
            );
            rollup::reconcile_assignment(&mut order, assignees.clone(), now);
            order.assignment = assignment_for(&order.assigned_editors);
        }
    }

    if let Some(status) = edit.status {
        order.status = status;
        if status == Status::Completed {
            order.completed_at = order.completed_at.or(Some(now));
        } else {
            order.completed_at = None;
        }
    }

    persist_order(&tx, &order)?;
    history::record(
        &tx,
        order_id,
        HistoryAction::Edited,
        actor,
        &json!({
            "fields": edit.fields,
            "status": edit.status,
            "editors": edit.assigned_editors,
        }),
        now,
    )?;
    tx.commit().context("commit edit")?;

    info!(order_id, actor, "team edit applied");
    Ok(order)
}

/// Move a waiting-approval order into the queue.
pub fn approve_order(
    conn: &mut Connection,
    order_id: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Order> {
    let tx = conn.transaction().context("begin approval transaction")?;
    let mut order = require_order(&tx, order_id)?;
    approve_in_tx(&tx, &mut order, actor, now)?;
    tx.commit().context("commit approval")?;
    Ok(order)
}

/// Approve the order and whitelist its creator for future self-orders.
pub fn approve_editor_and_order(
    conn: &mut Connection,
    order_id: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Order> {
    let tx = conn.transaction().context("begin approval transaction")?;
    let mut order = require_order(&tx, order_id)?;

    let Some(editor_id) = order.assigned_editors.iter().next().cloned() else {
        bail!("order '{order_id}' has no assigned editor to approve");
    };
    editors::set_self_order_approved(&tx, &editor_id, true)?;
    approve_in_tx(&tx, &mut order, actor, now)?;
    tx.commit().context("commit approval")?;

    info!(order_id, editor_id, "editor whitelisted for self-orders");
    Ok(order)
}

/// Record an editor-proposed change set for team-leader review.
pub fn submit_pending_edit(
    conn: &mut Connection,
    order_id: &str,
    editor_id: &str,
    editor_name: &str,
    changes: FieldEdits,
    now: DateTime<Utc>,
) -> Result<()> {
    ensure!(
        !changes.is_empty(),
        "pending edit for order '{order_id}' changes nothing"
    );

    let tx = conn.transaction().context("begin pending-edit transaction")?;
    let mut order = require_order(&tx, order_id)?;

    if !order.assigned_editors.contains(editor_id) {
        return Err(crate::rollup::RollupError::NotAssigned {
            order_id: order_id.to_string(),
            editor: editor_id.to_string(),
        }
        .into());
    }

    order.pending_edit = Some(PendingEdit {
        editor: editor_id.to_string(),
        editor_name: editor_name.to_string(),
        submitted_at: Some(now),
        changes: changes.clone(),
    });

    persist_order(&tx, &order)?;
    history::record(
        &tx,
        order_id,
        HistoryAction::EditRequested,
        editor_id,
        &json!({ "changes": changes }),
        now,
    )?;
    tx.commit().context("commit pending edit")?;
    Ok(())
}

/// Apply a pending edit and clear the review flag.
pub fn approve_pending_edit(
    conn: &mut Connection,
    order_id: &str,
    approver: &str,
    now: DateTime<Utc>,
) -> Result<Order> {
    let tx = conn.transaction().context("begin review transaction")?;
    let mut order = require_order(&tx, order_id)?;

    let Some(pending) = order.pending_edit.take() else {
        return Err(OpsError::NoPendingEdit {
            order_id: order_id.to_string(),
        }
        .into());
    };
    pending.changes.apply_to(&mut order);

    persist_order(&tx, &order)?;
    history::record(
        &tx,
        order_id,
        HistoryAction::EditApproved,
        approver,
        &json!({
            "edited_by": pending.editor,
            "approved_by": approver,
            "changes": pending.changes,
        }),
        now,
    )?;
    tx.commit().context("commit review")?;

    info!(order_id, approver, edited_by = %pending.editor, "pending edit approved");
    Ok(order)
}

/// Discard a pending edit without applying it.
pub fn reject_pending_edit(
    conn: &mut Connection,
    order_id: &str,
    approver: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let tx = conn.transaction().context("begin review transaction")?;
    let mut order = require_order(&tx, order_id)?;

    let Some(pending) = order.pending_edit.take() else {
        return Err(OpsError::NoPendingEdit {
            order_id: order_id.to_string(),
        }
        .into());
    };

    persist_order(&tx, &order)?;
    history::record(
        &tx,
        order_id,
        HistoryAction::EditRejected,
        approver,
        &json!({ "edited_by": pending.editor }),
        now,
    )?;
    tx.commit().context("commit review")?;
    Ok(())
}

/// Rate a finished order 1-5 and refresh each assignee's running average.
pub fn set_rating(
    conn: &mut Connection,
    order_id: &str,
    rating: u8,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(OpsError::RatingOutOfRange { rating }.into());
    }

    let tx = conn.transaction().context("begin rating transaction")?;
    let mut order = require_order(&tx, order_id)?;
    order.rating = Some(rating);
    persist_order(&tx, &order)?;

    for editor_id in &order.assigned_editors {
        let average: Option<f64> = tx
            .query_row(
                "SELECT AVG(o.rating)
                 FROM orders o
                 JOIN order_assignees a ON a.order_id = o.order_id
                 WHERE a.editor_id = ?1 AND o.rating IS NOT NULL",
                params![editor_id],
                |row| row.get(0),
            )
            .with_context(|| format!("average rating for '{editor_id}'"))?;
        editors::set_rating_average(&tx, editor_id, average)?;
    }

    history::record(
        &tx,
        order_id,
        HistoryAction::Rated,
        actor,
        &json!({ "rating": rating }),
        now,
    )?;
    tx.commit().context("commit rating")?;

    info!(order_id, rating, "order rated");
    Ok(())
}

/// Terminal deletion. Edge tables and history cascade with the row.
pub fn delete_order(conn: &Connection, order_id: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM orders WHERE order_id = ?1", params![order_id])
        .with_context(|| format!("delete order '{order_id}'"))?;

    if removed > 0 {
        warn!(order_id, "order deleted");
    }
    Ok(removed > 0)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const SELECT_ASSIGNEES: &str =
    "SELECT editor_id FROM order_assignees WHERE order_id = ?1 ORDER BY editor_id";
const SELECT_COMPLETIONS: &str =
    "SELECT editor_id FROM order_completions WHERE order_id = ?1 ORDER BY editor_id";

type RawOrder = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<i64>,
    Option<i64>,
);

fn raw_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOrder> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
    ))
}

fn order_from_raw(raw: RawOrder) -> Result<Order> {
    let (
        id,
        customer,
        telecaller,
        remark,
        priority,
        assignment,
        status,
        sample_image_url,
        rating,
        pending_edit,
        created_at_us,
        completed_at_us,
    ) = raw;

    let pending_edit = pending_edit
        .map(|text| {
            serde_json::from_str::<PendingEdit>(&text)
                .with_context(|| format!("decode pending edit for '{id}'"))
        })
        .transpose()?;

    let rating = rating
        .map(|value| u8::try_from(value).with_context(|| format!("rating overflow for '{id}'")))
        .transpose()?;

    Ok(Order {
        priority: Priority::from_str(&priority)
            .with_context(|| format!("decode priority for '{id}'"))?,
        assignment: Assignment::from_str(&assignment)
            .with_context(|| format!("decode assignment for '{id}'"))?,
        status: Status::from_str(&status).with_context(|| format!("decode status for '{id}'"))?,
        id,
        customer,
        telecaller,
        remark,
        sample_image_url,
        assigned_editors: BTreeSet::new(),
        completed_by: BTreeSet::new(),
        rating,
        pending_edit,
        created_at: created_at_us.and_then(DateTime::from_timestamp_micros),
        completed_at: completed_at_us.and_then(DateTime::from_timestamp_micros),
    })
}

fn order_row(conn: &Connection, order_id: &str) -> Result<Option<Order>> {
    let raw = conn
        .query_row(
            "SELECT order_id, customer, telecaller, remark, priority, assignment, status,
                    sample_image_url, rating, pending_edit, created_at_us, completed_at_us
             FROM orders WHERE order_id = ?1",
            params![order_id],
            raw_order,
        )
        .optional()
        .with_context(|| format!("load order '{order_id}'"))?;

    raw.map(order_from_raw).transpose()
}

fn order_rows(
    conn: &Connection,
    sql: &str,
    query_params: impl rusqlite::Params,
) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(sql).context("prepare order query")?;
    let raws = stmt
        .query_map(query_params, raw_order)
        .context("query orders")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read order rows")?;
    raws.into_iter().map(order_from_raw).collect()
}

fn attach_edges(conn: &Connection, mut orders: Vec<Order>) -> Result<Vec<Order>> {
    let assignees = edge_map(conn, "SELECT order_id, editor_id FROM order_assignees")?;
    let completions = edge_map(conn, "SELECT order_id, editor_id FROM order_completions")?;

    for order in &mut orders {
        if let Some(set) = assignees.get(&order.id) {
            order.assigned_editors = set.clone();
        }
        if let Some(set) = completions.get(&order.id) {
            order.completed_by = set.clone();
        }
    }
    Ok(orders)
}

fn edge_map(conn: &Connection, sql: &str) -> Result<HashMap<String, BTreeSet<String>>> {
    let mut stmt = conn.prepare(sql).context("prepare edge query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .context("query edges")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read edge rows")?;

    let mut map: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (order_id, editor_id) in rows {
        map.entry(order_id).or_default().insert(editor_id);
    }
    Ok(map)
}

fn edge_set(conn: &Connection, sql: &str, order_id: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(sql).context("prepare edge query")?;
    let rows = stmt
        .query_map(params![order_id], |row| row.get::<_, String>(0))
        .context("query edges")?
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("read edge rows")?;
    Ok(rows)
}

fn require_order(conn: &Connection, order_id: &str) -> Result<Order> {
    get_order(conn, order_id)?.ok_or_else(|| {
        OpsError::OrderNotFound {
            order_id: order_id.to_string(),
        }
        .into()
    })
}

fn insert_order(conn: &Connection, order: &Order) -> Result<()> {
    let pending_edit = encode_pending_edit(order)?;
    conn.execute(
        "INSERT INTO orders
         (order_id, customer, telecaller, remark, priority, assignment, status,
          sample_image_url, rating, pending_edit, created_at_us, completed_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            order.id,
            order.customer,
            order.telecaller,
            order.remark,
            order.priority.to_string(),
            order.assignment.to_string(),
            order.status.to_string(),
            order.sample_image_url,
            order.rating.map(i64::from),
            pending_edit,
            order.created_at.map(|at| at.timestamp_micros()),
            order.completed_at.map(|at| at.timestamp_micros()),
        ],
    )
    .with_context(|| format!("insert order '{}'", order.id))?;
    replace_edges(conn, order)
}

fn persist_order(conn: &Connection, order: &Order) -> Result<()> {
    let pending_edit = encode_pending_edit(order)?;
    conn.execute(
        "UPDATE orders SET
             customer = ?2, telecaller = ?3, remark = ?4, priority = ?5, assignment = ?6,
             status = ?7, sample_image_url = ?8, rating = ?9, pending_edit = ?10,
             created_at_us = ?11, completed_at_us = ?12
         WHERE order_id = ?1",
        params![
            order.id,
            order.customer,
            order.telecaller,
            order.remark,
            order.priority.to_string(),
            order.assignment.to_string(),
            order.status.to_string(),
            order.sample_image_url,
            order.rating.map(i64::from),
            pending_edit,
            order.created_at.map(|at| at.timestamp_micros()),
            order.completed_at.map(|at| at.timestamp_micros()),
        ],
    )
    .with_context(|| format!("update order '{}'", order.id))?;
    replace_edges(conn, order)
}

fn encode_pending_edit(order: &Order) -> Result<Option<String>> {
    order
        .pending_edit
        .as_ref()
        .map(|edit| serde_json::to_string(edit).context("encode pending edit"))
        .transpose()
}

fn replace_edges(conn: &Connection, order: &Order) -> Result<()> {
    conn.execute(
        "DELETE FROM order_assignees WHERE order_id = ?1",
        params![order.id],
    )
    .context("clear assignees")?;
    for editor_id in &order.assigned_editors {
        conn.execute(
            "INSERT INTO order_assignees (order_id, editor_id) VALUES (?1, ?2)",
            params![order.id, editor_id],
        )
        .context("insert assignee")?;
    }

    conn.execute(
        "DELETE FROM order_completions WHERE order_id = ?1",
        params![order.id],
    )
    .context("clear completions")?;
    for editor_id in &order.completed_by {
        conn.execute(
            "INSERT INTO order_completions (order_id, editor_id) VALUES (?1, ?2)",
            params![order.id, editor_id],
        )
        .context("insert completion")?;
    }
    Ok(())
}

fn approve_in_tx(
    conn: &Connection,
    order: &mut Order,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    if order.status != Status::WaitingApproval {
        return Err(OpsError::NotAwaitingApproval {
            order_id: order.id.clone(),
        }
        .into());
    }

    order.status = Status::Pending;
    persist_order(conn, order)?;
    history::record(
        conn,
        &order.id,
        HistoryAction::Approved,
        actor,
        &json!({}),
        now,
    )?;
    info!(order_id = %order.id, actor, "order approved");
    Ok(())
}

fn assignment_for(assignees: &BTreeSet<String>) -> Assignment {
    if assignees.len() > 1 {
        Assignment::Broadcast
    } else {
        Assignment::Direct
    }
}
