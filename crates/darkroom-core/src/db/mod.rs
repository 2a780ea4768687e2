//! SQLite projection store.
//!
//! The remote document database behind the dashboard is an external
//! collaborator; this module is the local projection of its state. Store
//! functions take a shared `&Connection` for reads and a `&mut Connection`
//! where a transaction is required, and return typed structs, never raw
//! rows.

pub mod editors;
pub mod history;
pub mod migrations;
pub mod notify;
pub mod orders;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (and migrate) the projection database at `path`.
pub fn open(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("open projection at {}", path.display()))?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("enable foreign keys")?;
    migrations::migrate(&mut conn).context("apply projection migrations")?;
    Ok(conn)
}

/// Open an in-memory projection, mainly for tests and simulations.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory projection")?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("enable foreign keys")?;
    migrations::migrate(&mut conn).context("apply projection migrations")?;
    Ok(conn)
}
