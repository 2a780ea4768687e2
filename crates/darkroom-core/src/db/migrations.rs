//! Versioned upgrades for the projection file.
//!
//! The projection is rebuildable, so the machinery here stays small. The
//! schema version is stamped in SQLite's `user_version` pragma; each upgrade
//! step is a self-contained SQL batch, and a step commits its DDL together
//! with the pragma bump in one transaction. A crash between steps leaves a
//! database that resumes from the recorded version on the next open.

use anyhow::{Context, Result, ensure};
use rusqlite::Connection;
use tracing::debug;

use super::schema;

/// Schema version this build writes and expects.
pub const LATEST_SCHEMA_VERSION: u32 = 1;

struct Step {
    to: u32,
    sql: &'static str,
}

/// Upgrade steps, one per version, oldest first.
const STEPS: &[Step] = &[Step {
    to: 1,
    sql: schema::MIGRATION_V1_SQL,
}];

/// The schema version stamped on `conn`; zero for a fresh database.
pub fn current_schema_version(conn: &Connection) -> Result<u32> {
    let stamped: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("read user_version pragma")?;
    u32::try_from(stamped).context("user_version is negative")
}

/// Bring `conn` up to [`LATEST_SCHEMA_VERSION`] and return the version the
/// database ends at.
///
/// Steps at or below the stamped version are skipped, so running this on
/// every open is cheap. A database stamped with a version this build does
/// not know is refused outright rather than partially rewritten.
pub fn migrate(conn: &mut Connection) -> Result<u32> {
    let mut version = current_schema_version(conn)?;
    ensure!(
        version <= LATEST_SCHEMA_VERSION,
        "projection schema v{version} is newer than this build (v{LATEST_SCHEMA_VERSION}); \
         refusing to touch it"
    );

    for step in STEPS.iter().filter(|step| step.to > version) {
        debug!(from = version, to = step.to, "upgrading projection schema");

        let tx = conn.transaction().context("begin schema upgrade")?;
        tx.execute_batch(step.sql)
            .with_context(|| format!("apply schema upgrade to v{}", step.to))?;
        tx.pragma_update(None, "user_version", i64::from(step.to))
            .with_context(|| format!("stamp schema version v{}", step.to))?;
        tx.commit()
            .with_context(|| format!("commit schema upgrade to v{}", step.to))?;

        version = step.to;
    }

    Ok(version)
}
