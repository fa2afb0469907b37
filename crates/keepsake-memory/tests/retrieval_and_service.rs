// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval thresholds, corrupt-row tolerance, and the debounced
//! service wiring.

use std::sync::Arc;
use std::time::Duration;

use keepsake_core::{CompletionEngine, EmbeddingEngine};
use keepsake_memory::service::MemoryOptions;
use keepsake_memory::types::MatchKind;
use keepsake_memory::{EmbeddingPipeline, MemoryRetriever, MemoryService, ModelGateway, ScriptPipeline};
use keepsake_storage::models::EmbeddingStatus;
use keepsake_storage::queries::{embeddings, notes};
use keepsake_test_utils::fixtures::{seed_image, seed_note, test_db};
use keepsake_test_utils::{MockCompleter, MockEmbedder};

const DIM: usize = 2;

struct Harness {
    db: keepsake_storage::Database,
    gateway: Arc<ModelGateway>,
    embedder: Arc<MockEmbedder>,
    completer: Arc<MockCompleter>,
}

async fn harness() -> Harness {
    let db = test_db().await;
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let completer = Arc::new(MockCompleter::new("a script"));
    let gateway = Arc::new(ModelGateway::new(
        Arc::clone(&embedder) as Arc<dyn EmbeddingEngine>,
        Arc::clone(&completer) as Arc<dyn CompletionEngine>,
    ));
    Harness {
        db,
        gateway,
        embedder,
        completer,
    }
}

fn retriever(h: &Harness) -> MemoryRetriever {
    MemoryRetriever::new(h.db.clone(), Arc::clone(&h.gateway), 0.5, 0.75, 3)
}

/// Unit vector whose cosine against [1, 0] is exactly `target`.
fn vector_with_similarity(target: f32) -> Vec<f32> {
    vec![target, (1.0 - target * target).sqrt()]
}

#[tokio::test]
async fn both_thresholds_prune_weak_matches() {
    let h = harness().await;
    let pipeline = EmbeddingPipeline::new(h.db.clone(), Arc::clone(&h.gateway), DIM);

    // Scores against the query will be 0.82, 0.55, 0.20. The floor
    // removes 0.20; the relative cutoff (0.75 * 0.82 = 0.615) removes
    // 0.55 even though it cleared the floor.
    let strong = seed_note(&h.db, "Strong", "c", &[]).await;
    let middling = seed_note(&h.db, "Middling", "c2", &[]).await;
    let weak = seed_note(&h.db, "Weak", "c3", &[]).await;
    for (id, score) in [(strong, 0.82), (middling, 0.55), (weak, 0.20)] {
        h.embedder.push_vector(vector_with_similarity(score));
        pipeline.generate_note_text_embedding(id).await;
    }

    h.embedder.push_vector(vec![1.0, 0.0]);
    let results = retriever(&h).retrieve("query").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].note_id, strong);
    assert!((results[0].score - 0.82).abs() < 1e-3);
    assert_eq!(results[0].matched, MatchKind::Text);
}

#[tokio::test]
async fn caption_match_can_beat_text_match() {
    let h = harness().await;
    let pipeline = EmbeddingPipeline::new(h.db.clone(), Arc::clone(&h.gateway), DIM);

    let note_id = seed_note(&h.db, "Note", "c", &[]).await;
    let image_id = seed_image(&h.db, note_id, "file://a.jpg", "A caption").await;
    h.embedder.push_vector(vector_with_similarity(0.55));
    pipeline.generate_note_text_embedding(note_id).await;
    h.embedder.push_vector(vector_with_similarity(0.9));
    pipeline.generate_image_embedding(image_id).await;

    h.embedder.push_vector(vec![1.0, 0.0]);
    let results = retriever(&h).retrieve("query").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matched, MatchKind::Image);
    assert!((results[0].score - 0.9).abs() < 1e-3);
}

#[tokio::test]
async fn corrupt_rows_are_skipped_not_fatal() {
    let h = harness().await;
    let pipeline = EmbeddingPipeline::new(h.db.clone(), Arc::clone(&h.gateway), DIM);

    let good = seed_note(&h.db, "Good", "c", &[]).await;
    h.embedder.push_vector(vector_with_similarity(0.9));
    pipeline.generate_note_text_embedding(good).await;

    // A seven-byte blob cannot decode as f32s.
    let corrupt = seed_note(&h.db, "Corrupt", "c2", &[]).await;
    embeddings::upsert_note_embedding(
        &h.db,
        corrupt,
        vec![0u8; 7],
        0,
        "bogus",
        EmbeddingStatus::Completed,
    )
    .await
    .unwrap();

    h.embedder.push_vector(vec![1.0, 0.0]);
    let results = retriever(&h).retrieve("query").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].note_id, good);
}

#[tokio::test]
async fn empty_query_and_unready_backend_return_nothing() {
    let h = harness().await;
    let retriever = retriever(&h);

    assert!(retriever.retrieve("   ").await.is_empty());
    assert_eq!(h.embedder.calls(), 0);

    h.embedder.set_ready(false);
    assert!(retriever.retrieve("query").await.is_empty());
    assert_eq!(h.embedder.calls(), 0);
}

#[tokio::test]
async fn empty_completion_never_clobbers_an_existing_script() {
    let h = harness().await;
    let scripts = ScriptPipeline::new(h.db.clone(), Arc::clone(&h.gateway), 0.8, 320);
    let note_id = seed_note(&h.db, "t", "c", &[]).await;

    h.completer.push_response("You were by the sea.");
    scripts.generate_recall_script(note_id).await;
    h.completer.push_response("   ");
    scripts.generate_recall_script(note_id).await;

    let note = notes::get_note(&h.db, note_id).await.unwrap().unwrap();
    assert_eq!(note.recall_script.as_deref(), Some("You were by the sea."));
}

fn service(h: &Harness, debounce: Duration) -> MemoryService {
    MemoryService::new(
        h.db.clone(),
        Arc::clone(&h.gateway),
        MemoryOptions {
            embedding_dim: DIM,
            similarity_floor: 0.5,
            relative_threshold: 0.75,
            top_k: 3,
            debounce_delay: debounce,
            session_size: 5,
            script_temperature: 0.8,
            script_max_tokens: 320,
        },
    )
}

#[tokio::test]
async fn rapid_saves_coalesce_into_one_pass_and_chain_a_script() {
    let h = harness().await;
    let service = service(&h, Duration::from_millis(20));
    let note_id = seed_note(&h.db, "t", "c", &[]).await;

    service.note_saved(note_id);
    service.note_saved(note_id);
    service.note_saved(note_id);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.embedder.calls(), 1, "three saves, one embedding pass");
    assert_eq!(h.completer.calls(), 1, "script generated after the pass");

    let note = notes::get_note(&h.db, note_id).await.unwrap().unwrap();
    assert_eq!(note.recall_script.as_deref(), Some("a script"));
    assert!(embeddings::get_note_embedding(&h.db, note_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn reminisce_marks_the_session_as_shown() {
    let h = harness().await;
    let service = service(&h, Duration::from_millis(20));
    let a = seed_note(&h.db, "a", "c", &[]).await;
    let b = seed_note(&h.db, "b", "c", &[]).await;

    let mut rng = rand::thread_rng();
    let session = service.reminisce(&mut rng).await;
    assert_eq!(session.len(), 2);

    for id in [a, b] {
        let note = notes::get_note(&h.db, id).await.unwrap().unwrap();
        assert!(note.last_shown_at.is_some());
    }
}
