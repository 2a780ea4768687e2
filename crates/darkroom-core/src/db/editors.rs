//! Editor roster persistence.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::info;

use crate::config::TeamConfig;
use crate::error::OpsError;
use crate::model::{Editor, Employment, Role};

/// Insert or replace an editor record.
pub fn upsert_editor(conn: &Connection, editor: &Editor) -> Result<()> {
    let targets = serde_json::to_string(&editor.targets).context("encode targets map")?;
    conn.execute(
        "INSERT INTO editors
         (editor_id, email, name, role, employment, self_order_approved, rating, targets)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(editor_id) DO UPDATE SET
             email = excluded.email,
             name = excluded.name,
             role = excluded.role,
             employment = excluded.employment,
             self_order_approved = excluded.self_order_approved,
             rating = excluded.rating,
             targets = excluded.targets",
        params![
            editor.id,
            editor.email,
            editor.name,
            editor.role.to_string(),
            editor.employment.to_string(),
            i64::from(editor.self_order_approved),
            editor.rating,
            targets,
        ],
    )
    .with_context(|| format!("upsert editor '{}'", editor.id))?;
    Ok(())
}

/// Load a single editor by id.
pub fn get_editor(conn: &Connection, editor_id: &str) -> Result<Option<Editor>> {
    let raw = conn
        .query_row(
            "SELECT editor_id, email, name, role, employment, self_order_approved, rating, targets
             FROM editors WHERE editor_id = ?1",
            params![editor_id],
            raw_editor,
        )
        .optional()
        .with_context(|| format!("load editor '{editor_id}'"))?;

    raw.map(editor_from_raw).transpose()
}

/// The working roster: active editors, team leaders excluded, ordered by
/// name for stable display and tie-breaking.
pub fn active_editors(conn: &Connection) -> Result<Vec<Editor>> {
    let mut stmt = conn
        .prepare(
            "SELECT editor_id, email, name, role, employment, self_order_approved, rating, targets
             FROM editors
             WHERE role = 'editor' AND employment = 'active'
             ORDER BY name, editor_id",
        )
        .context("prepare roster query")?;

    let raws = stmt
        .query_map([], raw_editor)
        .context("query roster")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read roster rows")?;

    raws.into_iter().map(editor_from_raw).collect()
}

/// Set an editor's completion target for a calendar month (`YYYY-MM`).
///
/// The target is bounded by `targets.monthly_cap`; zero clears the target.
pub fn set_monthly_target(
    conn: &Connection,
    cfg: &TeamConfig,
    editor_id: &str,
    month: &str,
    target: u32,
) -> Result<()> {
    if target > cfg.targets.monthly_cap {
        return Err(OpsError::TargetAboveCap {
            target,
            cap: cfg.targets.monthly_cap,
        }
        .into());
    }

    let mut editor = get_editor(conn, editor_id)?.ok_or_else(|| OpsError::EditorNotFound {
        editor_id: editor_id.to_string(),
    })?;

    if target == 0 {
        editor.targets.remove(month);
    } else {
        editor.targets.insert(month.to_string(), target);
    }
    upsert_editor(conn, &editor)?;
    info!(editor_id, month, target, "monthly target updated");
    Ok(())
}

/// Flip the self-order pre-approval flag.
pub fn set_self_order_approved(conn: &Connection, editor_id: &str, approved: bool) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE editors SET self_order_approved = ?2 WHERE editor_id = ?1",
            params![editor_id, i64::from(approved)],
        )
        .with_context(|| format!("update self-order approval for '{editor_id}'"))?;

    if changed == 0 {
        return Err(OpsError::EditorNotFound {
            editor_id: editor_id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Store a recomputed rating average (`None` clears it).
pub(crate) fn set_rating_average(
    conn: &Connection,
    editor_id: &str,
    average: Option<f64>,
) -> Result<()> {
    conn.execute(
        "UPDATE editors SET rating = ?2 WHERE editor_id = ?1",
        params![editor_id, average],
    )
    .with_context(|| format!("update rating average for '{editor_id}'"))?;
    Ok(())
}

type RawEditor = (
    String,
    String,
    String,
    String,
    String,
    i64,
    Option<f64>,
    String,
);

fn raw_editor(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEditor> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn editor_from_raw(raw: RawEditor) -> Result<Editor> {
    let (id, email, name, role, employment, self_order_approved, rating, targets) = raw;
    let targets: BTreeMap<String, u32> =
        serde_json::from_str(&targets).with_context(|| format!("decode targets for '{id}'"))?;

    Ok(Editor {
        role: Role::from_str(&role).with_context(|| format!("decode role for '{id}'"))?,
        employment: Employment::from_str(&employment)
            .with_context(|| format!("decode employment for '{id}'"))?,
        id,
        email,
        name,
        self_order_approved: self_order_approved != 0,
        rating,
        targets,
    })
}
