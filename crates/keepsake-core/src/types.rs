// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Keepsake crates.

use serde::{Deserialize, Serialize};

/// Sampling parameters for a text-completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Softmax temperature. Lower values make output more deterministic.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Top-k sampling cutoff. 0 disables.
    pub top_k: u32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Stop sequences that end generation early.
    pub stop: Vec<String>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_tokens: 512,
            stop: Vec::new(),
        }
    }
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
///
/// All persisted timestamps use this format.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a persisted ISO-8601 timestamp back into a UTC datetime.
pub fn parse_iso(ts: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
