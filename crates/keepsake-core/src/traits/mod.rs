// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by on-device inference engines.

pub mod completion;
pub mod embedding;

pub use completion::CompletionEngine;
pub use embedding::EmbeddingEngine;
