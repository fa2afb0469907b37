// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Note CRUD operations.
//!
//! Creates and updates run in a transaction so the note row and its tag
//! links commit together; background pipelines only ever observe a fully
//! saved note.

use keepsake_core::{now_iso, KeepsakeError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{NewNote, Note, NoteDetails};
use crate::queries::tags::replace_tag_links;

fn row_to_note(row: &rusqlite::Row) -> Result<Note, rusqlite::Error> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        audio_ref: row.get(3)?,
        recall_script: row.get(4)?,
        last_shown_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const NOTE_COLUMNS: &str =
    "id, title, content, audio_ref, recall_script, last_shown_at, created_at, updated_at";

/// Create a note with its tags in one transaction. Returns the new note id.
pub async fn create_note(db: &Database, new: &NewNote) -> Result<i64, KeepsakeError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let now = now_iso();
            tx.execute(
                "INSERT INTO notes (title, content, audio_ref, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![new.title, new.content, new.audio_ref, now],
            )?;
            let note_id = tx.last_insert_rowid();
            replace_tag_links(&tx, note_id, &new.tags)?;
            tx.commit()?;
            Ok(note_id)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace a note's title, content, audio reference, and tags.
///
/// Returns `NotFound` if the note does not exist. The recall script and
/// last-shown timestamp are left untouched; the script pipeline owns them.
pub async fn update_note(db: &Database, id: i64, new: &NewNote) -> Result<(), KeepsakeError> {
    let new = new.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE notes SET title = ?1, content = ?2, audio_ref = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![new.title, new.content, new.audio_ref, now_iso(), id],
            )?;
            if changed > 0 {
                replace_tag_links(&tx, id, &new.tags)?;
            }
            tx.commit()?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)?;

    if changed == 0 {
        return Err(KeepsakeError::NotFound { entity: "note", id });
    }
    Ok(())
}

/// Get a note by id.
pub async fn get_note(db: &Database, id: i64) -> Result<Option<Note>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_note);
            match result {
                Ok(note) => Ok(Some(note)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a note hydrated with its tag names and images.
pub async fn get_note_details(
    db: &Database,
    id: i64,
) -> Result<Option<NoteDetails>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"))?;
            let note = match stmt.query_row(params![id], row_to_note) {
                Ok(note) => note,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let details = hydrate_note(conn, note)?;
            Ok(Some(details))
        })
        .await
        .map_err(map_tr_err)
}

/// List all notes hydrated with tags and images, newest first.
///
/// Used as the reminiscence candidate pool; a personal journal is small
/// enough to load in full.
pub async fn list_note_details(db: &Database) -> Result<Vec<NoteDetails>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let notes = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map([], row_to_note)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            let mut details = Vec::with_capacity(notes.len());
            for note in notes {
                details.push(hydrate_note(conn, note)?);
            }
            Ok(details)
        })
        .await
        .map_err(map_tr_err)
}

/// List notes (no tags/images), newest first, capped at `limit`.
pub async fn list_notes(db: &Database, limit: usize) -> Result<Vec<Note>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], row_to_note)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Substring search over title and content.
///
/// This is the trivial exact-match path; semantic search lives in the
/// retrieval engine.
pub async fn search_notes_like(
    db: &Database,
    needle: &str,
    limit: usize,
) -> Result<Vec<Note>, KeepsakeError> {
    let pattern = format!("%{}%", needle.replace('%', "\\%").replace('_', "\\_"));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes
                 WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\'
                 ORDER BY updated_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![pattern, limit as i64], row_to_note)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a note. Tag links, images, and embeddings cascade.
///
/// Returns whether a row was actually deleted.
pub async fn delete_note(db: &Database, id: i64) -> Result<bool, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Store a generated recall script on a note.
pub async fn set_recall_script(
    db: &Database,
    id: i64,
    script: &str,
) -> Result<bool, KeepsakeError> {
    let script = script.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE notes SET recall_script = ?1 WHERE id = ?2",
                params![script, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Record that a note was just shown in a reminiscence session.
pub async fn touch_last_shown(db: &Database, id: i64) -> Result<bool, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE notes SET last_shown_at = ?1 WHERE id = ?2",
                params![now_iso(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Attach tags and images to an already-loaded note row.
fn hydrate_note(
    conn: &rusqlite::Connection,
    note: Note,
) -> Result<NoteDetails, rusqlite::Error> {
    let tags = {
        let mut stmt = conn.prepare(
            "SELECT t.name FROM tags t
             JOIN note_tags nt ON nt.tag_id = t.id
             WHERE nt.note_id = ?1 ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![note.id], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    let images = {
        let mut stmt = conn.prepare(
            "SELECT id, note_id, uri, description FROM images WHERE note_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![note.id], |row| {
            Ok(crate::models::Image {
                id: row.get(0)?,
                note_id: row.get(1)?,
                uri: row.get(2)?,
                description: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    Ok(NoteDetails { note, tags, images })
}
