// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level memory service wiring.
//!
//! Two debounced coalescers run behind the save path: one for embedding
//! passes, one for recall scripts. A save schedules an embedding pass;
//! when that pass settles it schedules the script pass, so the script is
//! always generated against the text the embedding saw.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keepsake_storage::models::NoteDetails;
use keepsake_storage::Database;
use rand::Rng;
use tracing::debug;

use crate::coalescer::{CoalescedTask, TaskCoalescer};
use crate::gateway::ModelGateway;
use crate::pipeline::EmbeddingPipeline;
use crate::reminisce::ReminiscenceSelector;
use crate::retrieval::MemoryRetriever;
use crate::script::ScriptPipeline;
use crate::types::{EmbedOutcome, RetrievedNote};

/// Tunables for the memory engine, lifted from configuration.
#[derive(Debug, Clone)]
pub struct MemoryOptions {
    pub embedding_dim: usize,
    pub similarity_floor: f32,
    pub relative_threshold: f32,
    pub top_k: usize,
    pub debounce_delay: Duration,
    pub session_size: usize,
    pub script_temperature: f32,
    pub script_max_tokens: u32,
}

struct ScriptJob {
    scripts: Arc<ScriptPipeline>,
}

#[async_trait]
impl CoalescedTask for ScriptJob {
    async fn run(&self, id: i64) {
        self.scripts.generate_recall_script(id).await;
    }
}

struct EmbedJob {
    pipeline: Arc<EmbeddingPipeline>,
    script_coalescer: TaskCoalescer<ScriptJob>,
}

#[async_trait]
impl CoalescedTask for EmbedJob {
    async fn run(&self, id: i64) {
        let outcomes = self.pipeline.process_note_embeddings(id).await;
        debug!(note_id = id, ?outcomes, "embedding pass finished");
        // A vanished note needs no script; everything else does, even a
        // failed embedding, since the script only depends on the text.
        if !matches!(outcomes.first(), Some(EmbedOutcome::MissingEntity)) {
            self.script_coalescer.schedule(id);
        }
    }
}

pub struct MemoryService {
    pipeline: Arc<EmbeddingPipeline>,
    scripts: Arc<ScriptPipeline>,
    retriever: MemoryRetriever,
    selector: ReminiscenceSelector,
    embed_coalescer: TaskCoalescer<EmbedJob>,
}

impl MemoryService {
    pub fn new(db: Database, gateway: Arc<ModelGateway>, opts: MemoryOptions) -> Self {
        let pipeline = Arc::new(EmbeddingPipeline::new(
            db.clone(),
            Arc::clone(&gateway),
            opts.embedding_dim,
        ));
        let scripts = Arc::new(ScriptPipeline::new(
            db.clone(),
            Arc::clone(&gateway),
            opts.script_temperature,
            opts.script_max_tokens,
        ));
        let script_coalescer = TaskCoalescer::new(
            ScriptJob {
                scripts: Arc::clone(&scripts),
            },
            opts.debounce_delay,
        );
        let embed_coalescer = TaskCoalescer::new(
            EmbedJob {
                pipeline: Arc::clone(&pipeline),
                script_coalescer,
            },
            opts.debounce_delay,
        );
        let retriever = MemoryRetriever::new(
            db.clone(),
            Arc::clone(&gateway),
            opts.similarity_floor,
            opts.relative_threshold,
            opts.top_k,
        );
        let selector = ReminiscenceSelector::new(db, opts.session_size);
        Self {
            pipeline,
            scripts,
            retriever,
            selector,
            embed_coalescer,
        }
    }

    /// Notify the engine that a note was created or edited.
    ///
    /// Returns immediately; embeddings and the recall script catch up
    /// after the debounce window.
    pub fn note_saved(&self, note_id: i64) {
        self.embed_coalescer.schedule(note_id);
    }

    /// Run a full embedding pass for a note right now, bypassing the
    /// debounce. Used by the CLI where the process exits after the
    /// command.
    pub async fn process_now(&self, note_id: i64) -> Vec<EmbedOutcome> {
        let outcomes = self.pipeline.process_note_embeddings(note_id).await;
        if !matches!(outcomes.first(), Some(EmbedOutcome::MissingEntity)) {
            self.scripts.generate_recall_script(note_id).await;
        }
        outcomes
    }

    /// Semantic search over the journal.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievedNote> {
        self.retriever.retrieve(query).await
    }

    /// Pick a reminiscence session and stamp the chosen notes as shown.
    pub async fn reminisce(&self, rng: &mut impl Rng) -> Vec<NoteDetails> {
        let session = self.selector.select_session(rng).await;
        let ids: Vec<i64> = session.iter().map(|d| d.note.id).collect();
        self.selector.mark_shown(&ids).await;
        session
    }
}
