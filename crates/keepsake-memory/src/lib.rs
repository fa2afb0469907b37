// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory engine for the journal: embedding generation, debounced
//! background work, semantic retrieval, reminiscence selection, and
//! recall-script generation.
//!
//! The pipeline is write-behind: saving a note returns immediately and
//! embeddings catch up a debounce interval later. Retrieval never fails
//! outward; a degraded index degrades result quality, not the caller.

pub mod coalescer;
pub mod codec;
pub mod fingerprint;
pub mod gateway;
pub mod pipeline;
pub mod reminisce;
pub mod retrieval;
pub mod script;
pub mod service;
pub mod types;

pub use coalescer::{CoalescedTask, TaskCoalescer};
pub use gateway::ModelGateway;
pub use pipeline::EmbeddingPipeline;
pub use reminisce::ReminiscenceSelector;
pub use retrieval::MemoryRetriever;
pub use script::ScriptPipeline;
pub use service::MemoryService;
pub use types::{EmbedOutcome, MatchKind, RetrievedImage, RetrievedNote};
