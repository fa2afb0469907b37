// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use keepsake_core::KeepsakeError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Convert a tokio-rusqlite task error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> KeepsakeError {
    KeepsakeError::Storage {
        source: e.to_string().into(),
    }
}

fn storage_err(e: rusqlite::Error) -> KeepsakeError {
    KeepsakeError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the journal database.
///
/// Cheap to clone; all clones share the single background connection.
#[derive(Clone, Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations.
    pub async fn open(path: &Path, wal_mode: bool) -> Result<Self, KeepsakeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KeepsakeError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = Connection::open(path).await.map_err(storage_err)?;
        debug!(path = %path.display(), wal_mode, "opening journal database");
        Self::initialize(conn, wal_mode).await
    }

    /// Open an in-memory database with migrations applied. Test use only.
    pub async fn open_in_memory() -> Result<Self, KeepsakeError> {
        let conn = Connection::open_in_memory().await.map_err(storage_err)?;
        Self::initialize(conn, false).await
    }

    async fn initialize(conn: Connection, wal_mode: bool) -> Result<Self, KeepsakeError> {
        conn.call(move |conn| -> Result<(), KeepsakeError> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(storage_err)?;
            }
            // Cascade deletes from notes to tags-links, images, embeddings
            // rely on this pragma being set per connection.
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(storage_err)?;
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => KeepsakeError::Storage {
                source: other.to_string().into(),
            },
        })?;

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_in_memory_applies_migrations() {
        let db = Database::open_in_memory().await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                let n = conn.query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                     ('notes', 'tags', 'note_tags', 'images', 'note_embeddings', 'image_embeddings')",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.db");
        let db = Database::open(&path, true).await.unwrap();
        drop(db);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn open_failure_surfaces_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"definitely not a sqlite file").unwrap();

        // Parent "directory" is a regular file.
        let err = Database::open(&blocker.join("journal.db"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, KeepsakeError::Storage { .. }));

        // Garbage file fails during migration, not on open.
        let err = Database::open(&blocker, false).await.unwrap_err();
        assert!(matches!(err, KeepsakeError::Storage { .. }));
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().await.unwrap();
        let result = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO images (note_id, uri, description) VALUES (999, 'x', 'y')",
                    [],
                )?;
                Ok(())
            })
            .await;
        assert!(result.is_err(), "orphan image insert should violate FK");
    }
}
