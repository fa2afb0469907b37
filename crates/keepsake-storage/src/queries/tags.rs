// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag upserts and note-tag links.
//!
//! Tags are created lazily when a note first references them and are
//! never garbage-collected; an orphaned tag row is harmless.

use keepsake_core::KeepsakeError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::Tag;

/// Insert a tag if it does not exist and return its id.
///
/// Runs on a borrowed connection so it can participate in a note
/// transaction.
pub fn upsert_tag(conn: &rusqlite::Connection, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO tags (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    conn.query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
        row.get(0)
    })
}

/// Replace a note's tag links with the given set.
///
/// Tag names are trimmed; empty names are dropped.
pub fn replace_tag_links(
    conn: &rusqlite::Connection,
    note_id: i64,
    tags: &[String],
) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM note_tags WHERE note_id = ?1", params![note_id])?;
    for name in tags {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let tag_id = upsert_tag(conn, name)?;
        conn.execute(
            "INSERT INTO note_tags (note_id, tag_id) VALUES (?1, ?2)
             ON CONFLICT(note_id, tag_id) DO NOTHING",
            params![note_id, tag_id],
        )?;
    }
    Ok(())
}

/// Tag names for a note, sorted alphabetically.
pub async fn tags_for_note(db: &Database, note_id: i64) -> Result<Vec<String>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.name FROM tags t
                 JOIN note_tags nt ON nt.tag_id = t.id
                 WHERE nt.note_id = ?1 ORDER BY t.name",
            )?;
            let rows = stmt.query_map(params![note_id], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// All tags in the journal, sorted alphabetically.
pub async fn list_tags(db: &Database) -> Result<Vec<Tag>, KeepsakeError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
            let rows = stmt.query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}
