// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding record persistence for notes and image captions.
//!
//! Each note and each captioned image has at most one embedding row.
//! Rows carry a content fingerprint so the pipeline can skip regeneration
//! when the underlying text has not changed, and a status so failed
//! attempts are recorded without being retried on every pass.

use keepsake_core::{now_iso, KeepsakeError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{EmbeddingStatus, ImageEmbedding, NoteEmbedding};

/// Insert or replace a note's embedding record.
pub async fn upsert_note_embedding(
    db: &Database,
    note_id: i64,
    embedding: Vec<u8>,
    dimension: usize,
    text_hash: &str,
    status: EmbeddingStatus,
) -> Result<(), KeepsakeError> {
    let text_hash = text_hash.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO note_embeddings (note_id, embedding, dimension, text_hash, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(note_id) DO UPDATE SET
                     embedding = excluded.embedding,
                     dimension = excluded.dimension,
                     text_hash = excluded.text_hash,
                     status = excluded.status,
                     created_at = excluded.created_at",
                params![
                    note_id,
                    embedding,
                    dimension as i64,
                    text_hash,
                    status.as_str(),
                    now_iso()
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get the full embedding record for a note.
pub async fn get_note_embedding(
    db: &Database,
    note_id: i64,
) -> Result<Option<NoteEmbedding>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT note_id, embedding, dimension, text_hash, status, created_at
                 FROM note_embeddings WHERE note_id = ?1",
            )?;
            let result = stmt.query_row(params![note_id], |row| {
                Ok(NoteEmbedding {
                    note_id: row.get(0)?,
                    embedding: row.get(1)?,
                    dimension: row.get::<_, i64>(2)? as usize,
                    text_hash: row.get(3)?,
                    status: EmbeddingStatus::from_str_value(&row.get::<_, String>(4)?),
                    created_at: row.get(5)?,
                })
            });
            match result {
                Ok(rec) => Ok(Some(rec)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fingerprint of a note's stored embedding, regardless of status.
pub async fn get_note_embedding_hash(
    db: &Database,
    note_id: i64,
) -> Result<Option<String>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT text_hash FROM note_embeddings WHERE note_id = ?1",
                params![note_id],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(hash) => Ok(Some(hash)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Flip an existing note-embedding record to failed.
///
/// Vector and fingerprint are left untouched, so the next pass sees the
/// old hash and retries once the backend recovers. When no record
/// exists, nothing is written and the function reports false.
pub async fn mark_note_embedding_failed(
    db: &Database,
    note_id: i64,
) -> Result<bool, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE note_embeddings SET status = 'failed' WHERE note_id = ?1",
                params![note_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All completed note embeddings as `(note_id, blob)` pairs.
///
/// This is the retrieval scan set; failed records are excluded.
pub async fn all_completed_note_embeddings(
    db: &Database,
) -> Result<Vec<(i64, Vec<u8>)>, KeepsakeError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT note_id, embedding FROM note_embeddings WHERE status = 'completed'",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace an image-caption embedding record.
pub async fn upsert_image_embedding(
    db: &Database,
    image_id: i64,
    description: &str,
    embedding: Vec<u8>,
    dimension: usize,
    description_hash: &str,
    status: EmbeddingStatus,
) -> Result<(), KeepsakeError> {
    let description = description.to_string();
    let description_hash = description_hash.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO image_embeddings
                     (image_id, description, embedding, dimension, description_hash, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(image_id) DO UPDATE SET
                     description = excluded.description,
                     embedding = excluded.embedding,
                     dimension = excluded.dimension,
                     description_hash = excluded.description_hash,
                     status = excluded.status,
                     created_at = excluded.created_at",
                params![
                    image_id,
                    description,
                    embedding,
                    dimension as i64,
                    description_hash,
                    status.as_str(),
                    now_iso()
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get the full embedding record for an image.
pub async fn get_image_embedding(
    db: &Database,
    image_id: i64,
) -> Result<Option<ImageEmbedding>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT image_id, description, embedding, dimension, description_hash, status, created_at
                 FROM image_embeddings WHERE image_id = ?1",
            )?;
            let result = stmt.query_row(params![image_id], |row| {
                Ok(ImageEmbedding {
                    image_id: row.get(0)?,
                    description: row.get(1)?,
                    embedding: row.get(2)?,
                    dimension: row.get::<_, i64>(3)? as usize,
                    description_hash: row.get(4)?,
                    status: EmbeddingStatus::from_str_value(&row.get::<_, String>(5)?),
                    created_at: row.get(6)?,
                })
            });
            match result {
                Ok(rec) => Ok(Some(rec)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fingerprint of an image's stored caption embedding.
pub async fn get_image_embedding_hash(
    db: &Database,
    image_id: i64,
) -> Result<Option<String>, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT description_hash FROM image_embeddings WHERE image_id = ?1",
                params![image_id],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(hash) => Ok(Some(hash)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Flip an existing caption-embedding record to failed. See
/// [`mark_note_embedding_failed`] for the semantics.
pub async fn mark_image_embedding_failed(
    db: &Database,
    image_id: i64,
) -> Result<bool, KeepsakeError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE image_embeddings SET status = 'failed' WHERE image_id = ?1",
                params![image_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All completed caption embeddings as `(image_id, owning note_id, blob)`.
pub async fn all_completed_image_embeddings(
    db: &Database,
) -> Result<Vec<(i64, i64, Vec<u8>)>, KeepsakeError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ie.image_id, i.note_id, ie.embedding
                 FROM image_embeddings ie
                 JOIN images i ON i.id = ie.image_id
                 WHERE ie.status = 'completed'",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}
