// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion engine backed by Ollama's `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use keepsake_core::{CompletionEngine, KeepsakeError, SamplingParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct GenerateOptions<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaCompleter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaCompleter {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl CompletionEngine for OllamaCompleter {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, KeepsakeError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                system: system_prompt,
                prompt: user_prompt,
                stream: false,
                options: GenerateOptions {
                    temperature: params.temperature,
                    top_p: params.top_p,
                    top_k: params.top_k,
                    num_predict: params.max_tokens,
                    stop: &params.stop,
                },
            })
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| KeepsakeError::Inference {
                message: format!("generate request to {url} failed"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KeepsakeError::inference(format!(
                "generate request returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| KeepsakeError::Inference {
                message: "generate response was not valid JSON".to_string(),
                source: Some(Box::new(e)),
            })?;
        debug!(model = %self.model, chars = parsed.response.len(), "completion finished");
        Ok(parsed.response)
    }

    async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
