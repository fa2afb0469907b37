// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keepsake memory journal.

use thiserror::Error;

/// The primary error type used across Keepsake crates.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model engine errors (embedding or completion call failed).
    #[error("inference error: {message}")]
    Inference {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored embedding BLOB whose byte length is not a whole number
    /// of 32-bit floats.
    #[error("malformed embedding blob: {len} bytes is not a multiple of 4")]
    MalformedBlob { len: usize },

    /// A referenced entity does not exist in the store.
    #[error("{entity} not found: id {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeepsakeError {
    /// Convenience constructor for engine failures without an underlying source.
    pub fn inference(message: impl Into<String>) -> Self {
        KeepsakeError::Inference {
            message: message.into(),
            source: None,
        }
    }
}
