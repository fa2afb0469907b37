// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for journal entities.

pub mod embeddings;
pub mod images;
pub mod notes;
pub mod stats;
pub mod tags;
