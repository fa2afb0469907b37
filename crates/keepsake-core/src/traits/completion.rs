// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-completion capability trait.

use async_trait::async_trait;

use crate::error::KeepsakeError;
use crate::types::SamplingParams;

/// A model capability that generates text from a prompt.
///
/// Keepsake uses this for recall-script generation. The underlying model
/// context is not safe for overlapping calls; callers go through the
/// `ModelGateway`, which serializes access per context.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Generate a completion for the given system and user prompts.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, KeepsakeError>;

    /// Whether the engine is loaded and able to serve requests.
    async fn is_ready(&self) -> bool;
}
