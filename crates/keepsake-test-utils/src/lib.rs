// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference engines and storage fixtures for tests.

pub mod fixtures;
pub mod mock_models;

pub use mock_models::{MockCompleter, MockEmbedder};
