use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, Statement, params};

use super::EXPORT_VERSION;
use crate::model::{ClippingEntry, LocationRef, TitleGroup};
use crate::util::{ensure_parent_directory, now_utc_string};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct SqliteExportCounts {
    pub(super) titles: usize,
    pub(super) entries: usize,
}

/// Rebuilds the export database at `path` from scratch.
pub(super) fn write_sqlite(
    path: &Path,
    groups: &[&TitleGroup],
    source: &str,
) -> Result<SqliteExportCounts> {
    ensure_parent_directory(path)?;
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to replace existing export: {}", path.display()))?;
    }

    let mut connection = Connection::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    configure_connection(&connection)?;
    populate_export(&mut connection, groups, source)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS titles (
              title_id INTEGER PRIMARY KEY,
              title TEXT NOT NULL,
              display_title TEXT NOT NULL,
              author TEXT,
              highlight_count INTEGER NOT NULL,
              loose_note_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
              row_id INTEGER PRIMARY KEY AUTOINCREMENT,
              entry_id TEXT NOT NULL,
              title_id INTEGER NOT NULL,
              highlight_entry_id TEXT,
              kind TEXT NOT NULL,
              order_index INTEGER NOT NULL,
              datetime TEXT NOT NULL,
              added_at TEXT,
              location_kind TEXT,
              location_min INTEGER,
              location_max INTEGER,
              location_label TEXT,
              page TEXT,
              content TEXT NOT NULL,
              FOREIGN KEY(title_id) REFERENCES titles(title_id)
            );

            CREATE INDEX IF NOT EXISTS idx_entries_title ON entries(title_id, order_index);
            CREATE INDEX IF NOT EXISTS idx_entries_highlight ON entries(highlight_entry_id);
            ",
        )
        .context("failed to create export schema")
}

pub(super) fn populate_export(
    connection: &mut Connection,
    groups: &[&TitleGroup],
    source: &str,
) -> Result<SqliteExportCounts> {
    ensure_schema(connection)?;

    let tx = connection.transaction()?;
    let mut counts = SqliteExportCounts::default();

    {
        let mut metadata_statement = tx.prepare(
            "
            INSERT INTO metadata(key, value)
            VALUES(?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value=excluded.value
            ",
        )?;
        metadata_statement.execute(params!["export_version", EXPORT_VERSION.to_string()])?;
        metadata_statement.execute(params!["generated_at", now_utc_string()])?;
        metadata_statement.execute(params!["source", source])?;

        let mut title_statement = tx.prepare(
            "
            INSERT INTO titles(title_id, title, display_title, author, highlight_count, loose_note_count)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )?;
        let mut entry_statement = tx.prepare(
            "
            INSERT INTO entries(
              entry_id, title_id, highlight_entry_id, kind, order_index, datetime, added_at,
              location_kind, location_min, location_max, location_label, page, content
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )?;

        for (title_index, group) in groups.iter().enumerate() {
            let title_id = (title_index + 1) as i64;
            title_statement
                .execute(params![
                    title_id,
                    group.title,
                    group.display_title(),
                    group.author(),
                    group.highlights.len() as i64,
                    group.notes.len() as i64,
                ])
                .with_context(|| format!("failed to insert title: {}", group.title))?;
            counts.titles += 1;

            let mut order_index = 0_i64;
            for highlight in &group.highlights {
                insert_entry(&mut entry_statement, title_id, None, highlight, order_index)?;
                order_index += 1;

                for note in &highlight.notes {
                    insert_entry(
                        &mut entry_statement,
                        title_id,
                        Some(highlight.entry_id.as_str()),
                        note,
                        order_index,
                    )?;
                    order_index += 1;
                }
            }

            for note in &group.notes {
                insert_entry(&mut entry_statement, title_id, None, note, order_index)?;
                order_index += 1;
            }

            counts.entries += order_index as usize;
        }
    }

    tx.commit().context("failed to commit sqlite export")?;
    Ok(counts)
}

fn insert_entry(
    statement: &mut Statement<'_>,
    title_id: i64,
    highlight_entry_id: Option<&str>,
    entry: &ClippingEntry,
    order_index: i64,
) -> Result<()> {
    let (location_kind, location_min, location_max) = match &entry.location {
        Some(LocationRef::Point { value }) => {
            (Some("point"), Some(i64::from(*value)), Some(i64::from(*value)))
        }
        Some(LocationRef::Range { min, max }) => {
            (Some("range"), Some(i64::from(*min)), Some(i64::from(*max)))
        }
        Some(LocationRef::Unresolved { .. }) => (Some("unresolved"), None, None),
        None => (None, None, None),
    };
    let location_label = entry.location.as_ref().map(LocationRef::label);

    statement
        .execute(params![
            entry.entry_id,
            title_id,
            highlight_entry_id,
            entry.kind.as_str(),
            order_index,
            entry.datetime,
            entry.added_at,
            location_kind,
            location_min,
            location_max,
            location_label,
            entry.page,
            entry.content,
        ])
        .with_context(|| format!("failed to insert entry: {}", entry.entry_id))?;

    Ok(())
}
