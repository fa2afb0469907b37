// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic retrieval over note and caption embeddings.
//!
//! A brute-force cosine scan: the journal is personal-scale, so loading
//! every completed vector and scoring in memory beats maintaining an
//! index. Retrieval never fails outward; any error inside the scan
//! collapses to an empty result with a warning.

use std::collections::HashMap;
use std::sync::Arc;

use keepsake_core::KeepsakeError;
use keepsake_storage::queries::{embeddings, notes};
use keepsake_storage::Database;
use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::codec::decode_vector;
use crate::gateway::ModelGateway;
use crate::types::{MatchKind, RetrievedImage, RetrievedNote};

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or a zero-norm operand rather
/// than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub struct MemoryRetriever {
    db: Database,
    gateway: Arc<ModelGateway>,
    /// Absolute similarity floor; matches below it are noise.
    similarity_floor: f32,
    /// Fraction of the top score a match must reach to be kept.
    relative_threshold: f32,
    top_k: usize,
}

impl MemoryRetriever {
    pub fn new(
        db: Database,
        gateway: Arc<ModelGateway>,
        similarity_floor: f32,
        relative_threshold: f32,
        top_k: usize,
    ) -> Self {
        Self {
            db,
            gateway,
            similarity_floor,
            relative_threshold,
            top_k,
        }
    }

    /// Find the notes most semantically similar to the query.
    ///
    /// Every failure mode (backend down, storage error, corrupt rows)
    /// degrades to fewer or zero results, never an error.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievedNote> {
        let start = std::time::Instant::now();
        let results = match self.retrieve_inner(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "retrieval failed, returning no matches");
                Vec::new()
            }
        };
        counter!("keepsake_retrievals_total").increment(1);
        histogram!("keepsake_retrieval_seconds").record(start.elapsed().as_secs_f64());
        results
    }

    async fn retrieve_inner(&self, query: &str) -> Result<Vec<RetrievedNote>, KeepsakeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        if !self.gateway.embedder_ready().await {
            warn!("embedding backend not ready, skipping retrieval");
            return Ok(Vec::new());
        }
        let query_vec = self.gateway.embed(query).await?;

        // Best score per note across its text vector and all of its
        // caption vectors.
        let mut best: HashMap<i64, (f32, MatchKind)> = HashMap::new();

        for (note_id, blob) in embeddings::all_completed_note_embeddings(&self.db).await? {
            let vector = match decode_vector(&blob) {
                Ok(v) => v,
                Err(e) => {
                    warn!(note_id, error = %e, "skipping corrupt note embedding");
                    continue;
                }
            };
            let score = cosine_similarity(&query_vec, &vector);
            let entry = best.entry(note_id).or_insert((score, MatchKind::Text));
            if score >= entry.0 {
                *entry = (score, MatchKind::Text);
            }
        }

        for (image_id, note_id, blob) in
            embeddings::all_completed_image_embeddings(&self.db).await?
        {
            let vector = match decode_vector(&blob) {
                Ok(v) => v,
                Err(e) => {
                    warn!(image_id, error = %e, "skipping corrupt caption embedding");
                    continue;
                }
            };
            let score = cosine_similarity(&query_vec, &vector);
            match best.get_mut(&note_id) {
                Some(entry) if score > entry.0 => *entry = (score, MatchKind::Image),
                Some(_) => {}
                None => {
                    best.insert(note_id, (score, MatchKind::Image));
                }
            }
        }

        let mut ranked: Vec<(i64, f32, MatchKind)> = best
            .into_iter()
            .filter(|(_, (score, _))| *score >= self.similarity_floor)
            .map(|(id, (score, kind))| (id, score, kind))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        // Everything well below the best match is a different memory,
        // even if it cleared the absolute floor.
        if let Some(&(_, top_score, _)) = ranked.first() {
            let cutoff = top_score * self.relative_threshold;
            ranked.retain(|&(_, score, _)| score >= cutoff);
        }
        ranked.truncate(self.top_k);

        let mut results = Vec::with_capacity(ranked.len());
        for (note_id, score, matched) in ranked {
            match notes::get_note_details(&self.db, note_id).await {
                Ok(Some(details)) => results.push(RetrievedNote {
                    note_id,
                    title: details.note.title,
                    content: details.note.content,
                    tags: details.tags,
                    images: details
                        .images
                        .into_iter()
                        .map(|i| RetrievedImage {
                            uri: i.uri,
                            description: i.description,
                        })
                        .collect(),
                    audio_ref: details.note.audio_ref,
                    score,
                    matched,
                }),
                Ok(None) => {
                    debug!(note_id, "matched note vanished before hydration");
                }
                Err(e) => {
                    warn!(note_id, error = %e, "failed to hydrate matched note");
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3, -0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_negative_one() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_and_length_mismatch_yield_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
