//! Short-lived editor notifications.
//!
//! Alerts the team leader fires at the assignees of an order (typically the
//! overdue nudge). Rows are disposable: anything older than the configured
//! TTL is swept.

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::model::Order;

/// Notification severity, mirroring the dashboard banner styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Danger,
}

impl Kind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

/// A stored notification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub recipient: String,
    pub sender: String,
    pub message: String,
    pub order_id: Option<String>,
    pub order_name: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fan a message out to every editor assigned to `order`.
///
/// Returns the number of notifications written.
///
/// # Errors
///
/// Fails when the order has no assignees; there is nobody to notify.
pub fn notify_assignees(
    conn: &Connection,
    order: &Order,
    sender: &str,
    message: &str,
    kind: Kind,
    now: DateTime<Utc>,
) -> Result<usize> {
    ensure!(
        !order.assigned_editors.is_empty(),
        "order '{}' has no assigned editors",
        order.id
    );

    for editor in &order.assigned_editors {
        conn.execute(
            "INSERT INTO notifications
             (recipient, sender, message, order_id, order_name, kind, is_read, created_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                editor,
                sender,
                message,
                order.id,
                order.customer,
                kind.as_str(),
                now.timestamp_micros(),
            ],
        )
        .with_context(|| format!("notify '{editor}' about order '{}'", order.id))?;
    }

    Ok(order.assigned_editors.len())
}

/// Unread notifications for one recipient, newest first.
pub fn unread_for(conn: &Connection, recipient: &str) -> Result<Vec<Notification>> {
    let mut stmt = conn
        .prepare(
            "SELECT notification_id, recipient, sender, message, order_id, order_name,
                    kind, is_read, created_at_us
             FROM notifications
             WHERE recipient = ?1 AND is_read = 0
             ORDER BY created_at_us DESC, notification_id DESC",
        )
        .context("prepare notifications query")?;

    let rows = stmt
        .query_map(params![recipient], |row| {
            Ok(Notification {
                id: row.get(0)?,
                recipient: row.get(1)?,
                sender: row.get(2)?,
                message: row.get(3)?,
                order_id: row.get(4)?,
                order_name: row.get(5)?,
                kind: row.get(6)?,
                is_read: row.get::<_, i64>(7)? != 0,
                created_at: DateTime::from_timestamp_micros(row.get::<_, i64>(8)?),
            })
        })
        .context("query notifications")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read notification rows")?;

    Ok(rows)
}

/// Mark one notification as read. Returns false when the id is unknown.
pub fn mark_read(conn: &Connection, notification_id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
            params![notification_id],
        )
        .with_context(|| format!("mark notification {notification_id} read"))?;
    Ok(changed > 0)
}

/// Delete notifications older than `ttl_hours`. Returns the count removed.
pub fn sweep_expired(conn: &Connection, ttl_hours: u32, now: DateTime<Utc>) -> Result<usize> {
    let cutoff = now - Duration::hours(i64::from(ttl_hours));
    let removed = conn
        .execute(
            "DELETE FROM notifications WHERE created_at_us <= ?1",
            params![cutoff.timestamp_micros()],
        )
        .context("sweep expired notifications")?;

    if removed > 0 {
        debug!(removed, ttl_hours, "swept expired notifications");
    }
    Ok(removed)
}
