// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result types surfaced by the memory engine.

/// What happened to a single embedding attempt.
///
/// Background passes absorb failures; this tag is how they stay visible
/// in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// A fresh vector was generated and stored.
    Stored,
    /// The content fingerprint matched the stored record; nothing to do.
    Unchanged,
    /// The inference backend was unreachable; will retry on next save.
    NotReady,
    /// The note or image vanished between scheduling and execution.
    MissingEntity,
    /// Image caption was empty after trimming; captionless images are
    /// invisible to retrieval.
    SkippedEmptyCaption,
    /// Generation failed; recorded as failed and not retried until the
    /// content changes.
    Failed,
}

/// Which vector produced a retrieval match for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The note's own text embedding.
    Text,
    /// A caption embedding of one of the note's images.
    Image,
}

/// An image hydrated for a retrieval result.
#[derive(Debug, Clone)]
pub struct RetrievedImage {
    pub uri: String,
    pub description: String,
}

/// A note returned by semantic retrieval, hydrated and scored.
#[derive(Debug, Clone)]
pub struct RetrievedNote {
    pub note_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub images: Vec<RetrievedImage>,
    pub audio_ref: Option<String>,
    /// Cosine similarity of the best-matching vector, in [-1, 1].
    pub score: f32,
    /// Whether the best match came from note text or an image caption.
    pub matched: MatchKind,
}
