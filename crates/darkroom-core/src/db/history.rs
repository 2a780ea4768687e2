//! Append-only audit trail of order mutations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Created,
    StatusChanged,
    Edited,
    EditRequested,
    EditApproved,
    EditRejected,
    Approved,
    Rated,
}

impl HistoryAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged => "status_changed",
            Self::Edited => "edited",
            Self::EditRequested => "edit_requested",
            Self::EditApproved => "edit_approved",
            Self::EditRejected => "edit_rejected",
            Self::Approved => "approved",
            Self::Rated => "rated",
        }
    }
}

/// A recorded mutation, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub entry_id: i64,
    pub order_id: String,
    pub action: String,
    pub actor: String,
    pub details: serde_json::Value,
    pub at: Option<DateTime<Utc>>,
}

/// Append one entry to an order's audit trail.
pub fn record(
    conn: &Connection,
    order_id: &str,
    action: HistoryAction,
    actor: &str,
    details: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO order_history (order_id, action, actor, details, at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            order_id,
            action.as_str(),
            actor,
            details.to_string(),
            now.timestamp_micros(),
        ],
    )
    .with_context(|| format!("record {} for order '{order_id}'", action.as_str()))?;
    Ok(())
}

/// All entries for one order, oldest first.
pub fn list_for_order(conn: &Connection, order_id: &str) -> Result<Vec<HistoryEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT entry_id, order_id, action, actor, details, at_us
             FROM order_history
             WHERE order_id = ?1
             ORDER BY at_us, entry_id",
        )
        .context("prepare history query")?;

    let raws = stmt
        .query_map(params![order_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .context("query history")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read history rows")?;

    raws.into_iter()
        .map(|(entry_id, order_id, action, actor, details, at_us)| {
            let details = serde_json::from_str(&details)
                .with_context(|| format!("decode details for history entry {entry_id}"))?;
            Ok(HistoryEntry {
                entry_id,
                order_id,
                action,
                actor,
                details,
                at: DateTime::from_timestamp_micros(at_us),
            })
        })
        .collect()
}
