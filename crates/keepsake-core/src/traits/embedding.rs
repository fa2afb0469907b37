// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding capability trait.

use async_trait::async_trait;

use crate::error::KeepsakeError;

/// A model capability that turns text into a dense embedding vector.
///
/// Implementations are expected to return vectors of a fixed dimension
/// (768 for the default model). An empty vector is treated as a failed
/// embedding by the pipeline.
#[async_trait]
pub trait EmbeddingEngine: Send + Sync {
    /// Embed a single text into a dense f32 vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KeepsakeError>;

    /// Whether the engine is loaded and able to serve requests.
    ///
    /// Pipelines treat a not-ready engine as "no-op now, retry on the
    /// next content change" rather than an error.
    async fn is_ready(&self) -> bool;
}
