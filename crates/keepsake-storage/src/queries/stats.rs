// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journal-wide counters for the status surface.

use keepsake_core::KeepsakeError;

use crate::database::{map_tr_err, Database};

/// Row counts across the journal.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalStats {
    pub notes: usize,
    pub images: usize,
    pub note_embeddings_completed: usize,
    pub note_embeddings_failed: usize,
    pub image_embeddings_completed: usize,
    pub image_embeddings_failed: usize,
    pub scripts_ready: usize,
}

/// Collect row counts in one round trip.
pub async fn journal_stats(db: &Database) -> Result<JournalStats, KeepsakeError> {
    db.connection()
        .call(|conn| {
            let count = |sql: &str| -> Result<usize, rusqlite::Error> {
                conn.query_row(sql, [], |row| row.get::<_, i64>(0)).map(|n| n as usize)
            };
            Ok(JournalStats {
                notes: count("SELECT count(*) FROM notes")?,
                images: count("SELECT count(*) FROM images")?,
                note_embeddings_completed: count(
                    "SELECT count(*) FROM note_embeddings WHERE status = 'completed'",
                )?,
                note_embeddings_failed: count(
                    "SELECT count(*) FROM note_embeddings WHERE status = 'failed'",
                )?,
                image_embeddings_completed: count(
                    "SELECT count(*) FROM image_embeddings WHERE status = 'completed'",
                )?,
                image_embeddings_failed: count(
                    "SELECT count(*) FROM image_embeddings WHERE status = 'failed'",
                )?,
                scripts_ready: count(
                    "SELECT count(*) FROM notes WHERE recall_script IS NOT NULL",
                )?,
            })
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNote;
    use crate::queries::notes;

    #[tokio::test]
    async fn counts_start_at_zero_and_track_inserts() {
        let db = Database::open_in_memory().await.unwrap();
        let stats = journal_stats(&db).await.unwrap();
        assert_eq!(stats.notes, 0);

        notes::create_note(
            &db,
            &NewNote {
                title: "t".to_string(),
                content: "c".to_string(),
                audio_ref: None,
                tags: vec![],
            },
        )
        .await
        .unwrap();

        let stats = journal_stats(&db).await.unwrap();
        assert_eq!(stats.notes, 1);
        assert_eq!(stats.scripts_ready, 0);
    }
}
