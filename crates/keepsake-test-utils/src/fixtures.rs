// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage fixtures shared across test suites.

use keepsake_storage::models::NewNote;
use keepsake_storage::queries::{images, notes};
use keepsake_storage::Database;

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> Database {
    Database::open_in_memory()
        .await
        .expect("in-memory database should open")
}

/// Create a note with the given title/content and tags.
pub async fn seed_note(db: &Database, title: &str, content: &str, tags: &[&str]) -> i64 {
    notes::create_note(
        db,
        &NewNote {
            title: title.to_string(),
            content: content.to_string(),
            audio_ref: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        },
    )
    .await
    .expect("note insert should succeed")
}

/// Attach an image with a caption to a note.
pub async fn seed_image(db: &Database, note_id: i64, uri: &str, caption: &str) -> i64 {
    images::add_image(db, note_id, uri, caption)
        .await
        .expect("image insert should succeed")
}
