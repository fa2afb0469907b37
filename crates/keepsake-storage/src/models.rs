// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for journal entities.

use serde::{Deserialize, Serialize};

/// A journal note authored by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Row id.
    pub id: i64,
    /// Note title.
    pub title: String,
    /// Free-text body.
    pub content: String,
    /// Opaque reference to an attached audio recording.
    pub audio_ref: Option<String>,
    /// Generated narrative recall script, if one has been produced.
    pub recall_script: Option<String>,
    /// When this note was last presented in a reminiscence session.
    pub last_shown_at: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// A tag. Created lazily on first use; orphans are tolerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// An image attached to a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    /// Owning note.
    pub note_id: i64,
    /// Opaque file reference.
    pub uri: String,
    /// User-authored caption. May be empty, in which case the image
    /// never gets an embedding record.
    pub description: String,
}

/// A note hydrated with its tags and images.
#[derive(Debug, Clone)]
pub struct NoteDetails {
    pub note: Note,
    pub tags: Vec<String>,
    pub images: Vec<Image>,
}

/// Fields for creating a note.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub audio_ref: Option<String>,
    pub tags: Vec<String>,
}

/// Status of an embedding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingStatus {
    /// Vector was generated and stored.
    Completed,
    /// The last regeneration attempt failed. The record keeps its
    /// previous vector and fingerprint, so the next pass retries.
    Failed,
}

impl EmbeddingStatus {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingStatus::Completed => "completed",
            EmbeddingStatus::Failed => "failed",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "failed" => EmbeddingStatus::Failed,
            _ => EmbeddingStatus::Completed,
        }
    }
}

/// A persisted text-embedding record, one-to-one with a note.
#[derive(Debug, Clone)]
pub struct NoteEmbedding {
    pub note_id: i64,
    /// Raw vector BLOB (native-endian f32s).
    pub embedding: Vec<u8>,
    pub dimension: usize,
    /// Fingerprint of the composed title+tags+content text.
    pub text_hash: String,
    pub status: EmbeddingStatus,
    pub created_at: String,
}

/// A persisted caption-embedding record, one-to-one with an image.
#[derive(Debug, Clone)]
pub struct ImageEmbedding {
    pub image_id: i64,
    /// The caption that was embedded.
    pub description: String,
    pub embedding: Vec<u8>,
    pub dimension: usize,
    /// Fingerprint of the trimmed caption.
    pub description_hash: String,
    pub status: EmbeddingStatus,
    pub created_at: String,
}
