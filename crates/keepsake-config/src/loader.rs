// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./keepsake.toml` > `~/.config/keepsake/keepsake.toml`
//! > `/etc/keepsake/keepsake.toml` with environment variable overrides via
//! `KEEPSAKE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeepsakeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keepsake/keepsake.toml` (system-wide)
/// 3. `~/.config/keepsake/keepsake.toml` (user XDG config)
/// 4. `./keepsake.toml` (local directory)
/// 5. `KEEPSAKE_*` environment variables
pub fn load_config() -> Result<KeepsakeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeepsakeConfig::default()))
        .merge(Toml::file("/etc/keepsake/keepsake.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keepsake/keepsake.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keepsake.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<KeepsakeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeepsakeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeepsakeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeepsakeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `KEEPSAKE_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("KEEPSAKE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("journal_", "journal.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("models_", "models.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("reminiscence_", "reminiscence.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_files() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.journal.name, "keepsake");
        assert_eq!(config.models.embedding_dim, 768);
        assert_eq!(config.memory.top_k, 3);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[memory]
similarity_floor = 0.6
top_k = 5

[reminiscence]
session_size = 7
"#,
        )
        .unwrap();
        assert!((config.memory.similarity_floor - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.memory.top_k, 5);
        assert_eq!(config.reminiscence.session_size, 7);
        // Untouched sections keep defaults
        assert!((config.memory.relative_threshold - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[memory]
similarity_flor = 0.6
"#,
        );
        assert!(result.is_err());
    }
}
