// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keepsake memory journal.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Keepsake configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeepsakeConfig {
    /// Journal identity and logging settings.
    #[serde(default)]
    pub journal: JournalConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Model engine endpoint settings.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Memory pipeline and retrieval settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Reminiscence session settings.
    #[serde(default)]
    pub reminiscence: ReminiscenceConfig,
}

/// Journal identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// Display name of the journal.
    #[serde(default = "default_journal_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            name: default_journal_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_journal_name() -> String {
    "keepsake".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("keepsake").join("keepsake.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keepsake.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Model engine endpoint configuration.
///
/// Both engines are served by a local Ollama-compatible endpoint; the
/// embedding and narration models are separate contexts on that endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    /// Base URL of the local inference endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Expected embedding dimension.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Name of the narration (completion) model.
    #[serde(default = "default_narration_model")]
    pub narration_model: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dim: default_embedding_dim(),
            narration_model: default_narration_model(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_dim() -> usize {
    768
}

fn default_narration_model() -> String {
    "llama3.2:3b".to_string()
}

/// Memory pipeline and retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Absolute cosine-similarity floor for retrieval (0.0-1.0).
    /// Notes whose best match scores below this are never returned.
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f32,

    /// Relative threshold against the top score (0.0-1.0). A note is kept
    /// only if its score is at least this fraction of the best score.
    #[serde(default = "default_relative_threshold")]
    pub relative_threshold: f32,

    /// Maximum number of notes returned by a retrieval call.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Debounce delay in milliseconds for the background pipelines.
    #[serde(default = "default_debounce_delay_ms")]
    pub debounce_delay_ms: u64,

    /// Reserved for a future retry scheduler. Failed embeddings currently
    /// wait for the next save to trigger a pass; nothing consults this
    /// value.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            similarity_floor: default_similarity_floor(),
            relative_threshold: default_relative_threshold(),
            top_k: default_top_k(),
            debounce_delay_ms: default_debounce_delay_ms(),
            retry_limit: default_retry_limit(),
        }
    }
}

fn default_similarity_floor() -> f32 {
    0.5
}

fn default_relative_threshold() -> f32 {
    0.75
}

fn default_top_k() -> usize {
    3
}

fn default_debounce_delay_ms() -> u64 {
    300
}

fn default_retry_limit() -> u32 {
    3
}

/// Reminiscence session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReminiscenceConfig {
    /// Number of memories presented in one session.
    #[serde(default = "default_session_size")]
    pub session_size: usize,

    /// Sampling temperature for recall-script generation.
    #[serde(default = "default_script_temperature")]
    pub script_temperature: f32,

    /// Maximum tokens for a generated recall script.
    #[serde(default = "default_script_max_tokens")]
    pub script_max_tokens: u32,
}

impl Default for ReminiscenceConfig {
    fn default() -> Self {
        Self {
            session_size: default_session_size(),
            script_temperature: default_script_temperature(),
            script_max_tokens: default_script_max_tokens(),
        }
    }
}

fn default_session_size() -> usize {
    5
}

fn default_script_temperature() -> f32 {
    0.8
}

fn default_script_max_tokens() -> u32 {
    320
}
