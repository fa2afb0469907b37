// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image attachments for notes.

use keepsake_core::KeepsakeError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::Image;

fn row_to_image(row: &rusqlite::Row) -> Result<Image, rusqlite::Error> {
    Ok(Image {
        id: row.get(0)?,
        note_id: row.get(1)?,
        uri: row.get(2)?,
        description: row.get(3)?,
    })
}

/// Attach an image to a note. Returns the image id.
pub async fn add_image(
    db: &Database,
    note_id: i64,
    uri: &str,
    description: &str,
) -> Result<i64, KeepsakeError> {
    let uri = uri.to_string();
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO images (note_id, uri, description) VALUES (?1, ?2, ?3)",
                params![note_id, uri, description],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Update an image's caption. Returns whether a row changed.
pub async fn set_image_description(
    db: &Database,
    image_id: i64,
    description: &str,
) -> Result<bool, KeepsakeError> {
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE images SET description = ?1 WHERE id = ?2",
                params![description, image_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an image by id.
pub async fn get_image(db: &Database, image_id: i64) -> Result<Option<Image>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, note_id, uri, description FROM images WHERE id = ?1")?;
            match stmt.query_row(params![image_id], row_to_image) {
                Ok(image) => Ok(Some(image)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All images attached to a note, in insertion order.
pub async fn images_for_note(db: &Database, note_id: i64) -> Result<Vec<Image>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, note_id, uri, description FROM images WHERE note_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![note_id], row_to_image)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove an image. Its embedding record cascades.
pub async fn delete_image(db: &Database, image_id: i64) -> Result<bool, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM images WHERE id = ?1", params![image_id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
