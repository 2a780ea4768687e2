#![forbid(unsafe_code)]
//! darkroom-core library.
//!
//! Order model, shared-order completion rollup, and the SQLite projection
//! store for the darkroom order tracker.
//!
//! # Conventions
//!
//! - **Errors**: Typed errors live in [`error`]; fallible store and config
//!   functions return `anyhow::Result` with context at I/O seams.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`,
//!   `trace!`).

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod rollup;
pub mod watch;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorCode, OpsError};
pub use model::{
    Assignment, Editor, Employment, FieldEdits, Order, PendingEdit, Priority, Role, Status,
    TeamEdit, month_key,
};
pub use rollup::{RollupError, RollupOutcome, apply_editor_status_change, reconcile_assignment};
pub use watch::{Snapshot, SnapshotHub};
