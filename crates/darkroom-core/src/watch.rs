//! Push-based snapshot fan-out.
//!
//! The dashboard model is listener-driven: every committed write produces a
//! fresh snapshot of the full order list and roster, and every derived view
//! recomputes from that snapshot. This module is the seam between the store
//! and those consumers; subscribers run synchronously on the caller's
//! thread, in registration order.

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use crate::db::{editors, orders};
use crate::model::{Editor, Order};

/// One consistent view of the store: every order plus the active roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub editors: Vec<Editor>,
}

impl Snapshot {
    /// An empty snapshot, the state before the first load completes.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            orders: Vec::new(),
            editors: Vec::new(),
        }
    }
}

/// Load the current snapshot from the projection.
pub fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    Ok(Snapshot {
        orders: orders::list_orders(conn)?,
        editors: editors::active_editors(conn)?,
    })
}

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Fan-out point for snapshot updates.
#[derive(Default)]
pub struct SnapshotHub {
    subscribers: Vec<Subscriber>,
}

impl SnapshotHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it will see every snapshot published after
    /// this call.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Deliver `snapshot` to every subscriber, in registration order.
    pub fn publish(&mut self, snapshot: &Snapshot) {
        debug!(
            orders = snapshot.orders.len(),
            editors = snapshot.editors.len(),
            subscribers = self.subscribers.len(),
            "publishing snapshot"
        );
        for subscriber in &mut self.subscribers {
            subscriber(snapshot);
        }
    }

    /// Load the current snapshot and publish it in one step.
    ///
    /// Store callers use this after committing a write.
    pub fn publish_from(&mut self, conn: &Connection) -> Result<Snapshot> {
        let snapshot = load_snapshot(conn)?;
        self.publish(&snapshot);
        Ok(snapshot)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for SnapshotHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotHub")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
