// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core building blocks for the Keepsake memory journal.
//!
//! Defines the shared error taxonomy, the capability traits that the
//! on-device inference engines implement (`EmbeddingEngine`,
//! `CompletionEngine`), and small common types used across crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::KeepsakeError;
pub use traits::{CompletionEngine, EmbeddingEngine};
pub use types::{now_iso, parse_iso, SamplingParams};
