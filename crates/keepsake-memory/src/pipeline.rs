// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background embedding generation for notes and image captions.
//!
//! Every operation here is failure-absorbing: a pass that cannot embed
//! logs, records what it can, and returns an outcome tag. Nothing in the
//! save path ever sees an inference error.

use std::sync::Arc;

use futures::future::join_all;
use keepsake_storage::models::EmbeddingStatus;
use keepsake_storage::queries::{embeddings, images, notes};
use keepsake_storage::Database;
use metrics::counter;
use tracing::{debug, warn};

use crate::codec::encode_vector;
use crate::fingerprint::{compose_note_text, fingerprint};
use crate::gateway::ModelGateway;
use crate::types::EmbedOutcome;

pub struct EmbeddingPipeline {
    db: Database,
    gateway: Arc<ModelGateway>,
    expected_dim: usize,
}

impl EmbeddingPipeline {
    pub fn new(db: Database, gateway: Arc<ModelGateway>, expected_dim: usize) -> Self {
        Self {
            db,
            gateway,
            expected_dim,
        }
    }

    /// Regenerate a note's text embedding if its composed text changed.
    pub async fn generate_note_text_embedding(&self, note_id: i64) -> EmbedOutcome {
        let details = match notes::get_note_details(&self.db, note_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                debug!(note_id, "note deleted before embedding pass");
                return EmbedOutcome::MissingEntity;
            }
            Err(e) => {
                warn!(note_id, error = %e, "failed to load note for embedding");
                return EmbedOutcome::Failed;
            }
        };

        let text = compose_note_text(&details);
        let hash = fingerprint(&text);

        match embeddings::get_note_embedding_hash(&self.db, note_id).await {
            Ok(Some(stored)) if stored == hash => {
                debug!(note_id, "note text unchanged, skipping embedding");
                counter!("keepsake_embeddings_skipped_total").increment(1);
                return EmbedOutcome::Unchanged;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(note_id, error = %e, "failed to read stored embedding hash");
                return EmbedOutcome::Failed;
            }
        }

        if !self.gateway.embedder_ready().await {
            warn!(note_id, "embedding backend not ready, deferring");
            return EmbedOutcome::NotReady;
        }

        match self.gateway.embed(&text).await {
            Ok(vector) if !vector.is_empty() => {
                self.store_note_vector(note_id, &vector, &hash).await
            }
            Ok(_) => self.fail_note(note_id, "model returned an empty vector").await,
            Err(e) => self.fail_note(note_id, &e.to_string()).await,
        }
    }

    /// Flip an existing record to failed; a note that never embedded
    /// successfully gets no record at all.
    async fn fail_note(&self, note_id: i64, reason: &str) -> EmbedOutcome {
        warn!(note_id, reason, "note embedding failed");
        counter!("keepsake_embeddings_failed_total").increment(1);
        if let Err(e) = embeddings::mark_note_embedding_failed(&self.db, note_id).await {
            warn!(note_id, error = %e, "failed to record embedding failure");
        }
        EmbedOutcome::Failed
    }

    async fn store_note_vector(&self, note_id: i64, vector: &[f32], hash: &str) -> EmbedOutcome {
        if vector.len() != self.expected_dim {
            warn!(
                note_id,
                got = vector.len(),
                expected = self.expected_dim,
                "embedding dimension differs from configured model dimension"
            );
        }
        let blob = encode_vector(vector);
        match embeddings::upsert_note_embedding(
            &self.db,
            note_id,
            blob,
            vector.len(),
            hash,
            EmbeddingStatus::Completed,
        )
        .await
        {
            Ok(()) => {
                counter!("keepsake_embeddings_stored_total").increment(1);
                EmbedOutcome::Stored
            }
            Err(e) => {
                warn!(note_id, error = %e, "failed to store note embedding");
                EmbedOutcome::Failed
            }
        }
    }

    /// Regenerate an image's caption embedding if the caption changed.
    ///
    /// Images with an empty caption get no record at all and are
    /// invisible to retrieval.
    pub async fn generate_image_embedding(&self, image_id: i64) -> EmbedOutcome {
        let image = match images::get_image(&self.db, image_id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                debug!(image_id, "image deleted before embedding pass");
                return EmbedOutcome::MissingEntity;
            }
            Err(e) => {
                warn!(image_id, error = %e, "failed to load image for embedding");
                return EmbedOutcome::Failed;
            }
        };

        let caption = image.description.trim().to_string();
        if caption.is_empty() {
            return EmbedOutcome::SkippedEmptyCaption;
        }
        let hash = fingerprint(&caption);

        match embeddings::get_image_embedding_hash(&self.db, image_id).await {
            Ok(Some(stored)) if stored == hash => {
                counter!("keepsake_embeddings_skipped_total").increment(1);
                return EmbedOutcome::Unchanged;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(image_id, error = %e, "failed to read stored caption hash");
                return EmbedOutcome::Failed;
            }
        }

        if !self.gateway.embedder_ready().await {
            warn!(image_id, "embedding backend not ready, deferring");
            return EmbedOutcome::NotReady;
        }

        match self.gateway.embed(&caption).await {
            Ok(vector) if !vector.is_empty() => {
                let blob = encode_vector(&vector);
                match embeddings::upsert_image_embedding(
                    &self.db,
                    image_id,
                    &caption,
                    blob,
                    vector.len(),
                    &hash,
                    EmbeddingStatus::Completed,
                )
                .await
                {
                    Ok(()) => {
                        counter!("keepsake_embeddings_stored_total").increment(1);
                        EmbedOutcome::Stored
                    }
                    Err(e) => {
                        warn!(image_id, error = %e, "failed to store caption embedding");
                        EmbedOutcome::Failed
                    }
                }
            }
            Ok(_) => self.fail_image(image_id, "model returned an empty vector").await,
            Err(e) => self.fail_image(image_id, &e.to_string()).await,
        }
    }

    async fn fail_image(&self, image_id: i64, reason: &str) -> EmbedOutcome {
        warn!(image_id, reason, "caption embedding failed");
        counter!("keepsake_embeddings_failed_total").increment(1);
        if let Err(e) = embeddings::mark_image_embedding_failed(&self.db, image_id).await {
            warn!(image_id, error = %e, "failed to record caption failure");
        }
        EmbedOutcome::Failed
    }

    /// Full embedding pass for a note: its text plus every image caption.
    ///
    /// Text and caption embeddings fan out concurrently; the gateway slot
    /// still serializes the actual inference calls. The text outcome is
    /// always first in the returned vector.
    pub async fn process_note_embeddings(&self, note_id: i64) -> Vec<EmbedOutcome> {
        if !self.gateway.embedder_ready().await {
            warn!(note_id, "embedding backend not ready, skipping pass");
            return vec![EmbedOutcome::NotReady];
        }

        let image_ids: Vec<i64> = match images::images_for_note(&self.db, note_id).await {
            Ok(images) => images.iter().map(|i| i.id).collect(),
            Err(e) => {
                warn!(note_id, error = %e, "failed to list images for embedding pass");
                return vec![self.generate_note_text_embedding(note_id).await];
            }
        };

        let (text_outcome, caption_outcomes) = tokio::join!(
            self.generate_note_text_embedding(note_id),
            join_all(image_ids.iter().map(|&id| self.generate_image_embedding(id))),
        );

        let mut outcomes = Vec::with_capacity(1 + caption_outcomes.len());
        outcomes.push(text_outcome);
        outcomes.extend(caption_outcomes);
        outcomes
    }
}
