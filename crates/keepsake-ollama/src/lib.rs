// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference engines backed by a local Ollama server.

pub mod completer;
pub mod embedder;

pub use completer::OllamaCompleter;
pub use embedder::OllamaEmbedder;
