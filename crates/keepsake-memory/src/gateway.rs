// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized access to the inference backend.
//!
//! A local model server thrashes badly under concurrent requests to the
//! same model, so each model context gets a single async mutex slot.
//! Embedding and completion use different contexts and may overlap with
//! each other, never with themselves.

use std::sync::Arc;

use keepsake_core::{CompletionEngine, EmbeddingEngine, KeepsakeError, SamplingParams};
use tokio::sync::Mutex;

pub struct ModelGateway {
    embedder: Arc<dyn EmbeddingEngine>,
    completer: Arc<dyn CompletionEngine>,
    embed_slot: Mutex<()>,
    complete_slot: Mutex<()>,
}

impl ModelGateway {
    pub fn new(embedder: Arc<dyn EmbeddingEngine>, completer: Arc<dyn CompletionEngine>) -> Self {
        Self {
            embedder,
            completer,
            embed_slot: Mutex::new(()),
            complete_slot: Mutex::new(()),
        }
    }

    /// Embed one text, holding the embedding slot for the duration.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, KeepsakeError> {
        let _slot = self.embed_slot.lock().await;
        self.embedder.embed(text).await
    }

    /// Run one completion, holding the narration slot for the duration.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, KeepsakeError> {
        let _slot = self.complete_slot.lock().await;
        self.completer.complete(system_prompt, user_prompt, params).await
    }

    pub async fn embedder_ready(&self) -> bool {
        self.embedder.is_ready().await
    }

    pub async fn completer_ready(&self) -> bool {
        self.completer.is_ready().await
    }
}
