// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding engine backed by Ollama's `/api/embed` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use keepsake_core::{EmbeddingEngine, KeepsakeError};
use serde::{Deserialize, Serialize};
use tracing::debug;

const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingEngine for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KeepsakeError> {
        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .timeout(EMBED_TIMEOUT)
            .send()
            .await
            .map_err(|e| KeepsakeError::Inference {
                message: format!("embed request to {url} failed"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KeepsakeError::inference(format!(
                "embed request returned {status}: {body}"
            )));
        }

        let parsed: EmbedResponse =
            response.json().await.map_err(|e| KeepsakeError::Inference {
                message: "embed response was not valid JSON".to_string(),
                source: Some(Box::new(e)),
            })?;

        let vector = parsed
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                KeepsakeError::inference(format!(
                    "model {} returned an empty embedding",
                    self.model
                ))
            })?;
        debug!(model = %self.model, dim = vector.len(), "embedded text");
        Ok(vector)
    }

    async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
