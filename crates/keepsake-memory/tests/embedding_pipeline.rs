// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the embedding pipeline against an in-memory
//! database and mock inference engines.

use std::sync::Arc;

use keepsake_core::{CompletionEngine, EmbeddingEngine};
use keepsake_memory::types::EmbedOutcome;
use keepsake_memory::{EmbeddingPipeline, ModelGateway};
use keepsake_storage::models::NewNote;
use keepsake_storage::queries::{embeddings, notes};
use keepsake_test_utils::fixtures::{seed_image, seed_note, test_db};
use keepsake_test_utils::{MockCompleter, MockEmbedder};

const DIM: usize = 8;

fn pipeline(
    db: keepsake_storage::Database,
) -> (EmbeddingPipeline, Arc<MockEmbedder>, Arc<MockCompleter>) {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let completer = Arc::new(MockCompleter::new("a script"));
    let gateway = Arc::new(ModelGateway::new(
        Arc::clone(&embedder) as Arc<dyn EmbeddingEngine>,
        Arc::clone(&completer) as Arc<dyn CompletionEngine>,
    ));
    (EmbeddingPipeline::new(db, gateway, DIM), embedder, completer)
}

#[tokio::test]
async fn unchanged_note_makes_no_engine_calls_and_no_writes() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Beach day", "Sand everywhere.", &["summer"]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
    assert_eq!(embedder.calls(), 1);
    let first = embeddings::get_note_embedding(&db, note_id).await.unwrap().unwrap();

    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Unchanged
    );
    assert_eq!(embedder.calls(), 1, "no inference for unchanged text");

    let second = embeddings::get_note_embedding(&db, note_id).await.unwrap().unwrap();
    assert_eq!(first.created_at, second.created_at, "no write for unchanged text");
    assert_eq!(first.embedding, second.embedding);
}

#[tokio::test]
async fn edited_note_regenerates() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Beach day", "Sand everywhere.", &[]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    pipeline.generate_note_text_embedding(note_id).await;
    notes::update_note(
        &db,
        note_id,
        &NewNote {
            title: "Beach day".to_string(),
            content: "Sand everywhere, even in the sandwiches.".to_string(),
            audio_ref: None,
            tags: vec![],
        },
    )
    .await
    .unwrap();

    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
    assert_eq!(embedder.calls(), 2);
}

#[tokio::test]
async fn tag_change_alone_regenerates() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Beach day", "Sand everywhere.", &["a"]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());
    pipeline.generate_note_text_embedding(note_id).await;

    notes::update_note(
        &db,
        note_id,
        &NewNote {
            title: "Beach day".to_string(),
            content: "Sand everywhere.".to_string(),
            audio_ref: None,
            tags: vec!["a".to_string(), "b".to_string()],
        },
    )
    .await
    .unwrap();

    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
    assert_eq!(embedder.calls(), 2);
}

#[tokio::test]
async fn first_attempt_failure_leaves_no_record_and_retries() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Beach day", "Sand everywhere.", &[]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    embedder.set_fail(true);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Failed
    );
    assert!(
        embeddings::get_note_embedding(&db, note_id).await.unwrap().is_none(),
        "a note that never embedded gets no record"
    );

    embedder.set_fail(false);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
    assert_eq!(embedder.calls(), 2);
}

#[tokio::test]
async fn failure_after_success_flips_status_but_keeps_the_old_vector() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Beach day", "Sand everywhere.", &[]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    pipeline.generate_note_text_embedding(note_id).await;
    let good = embeddings::get_note_embedding(&db, note_id).await.unwrap().unwrap();

    notes::update_note(
        &db,
        note_id,
        &NewNote {
            title: "Beach day".to_string(),
            content: "New text.".to_string(),
            audio_ref: None,
            tags: vec![],
        },
    )
    .await
    .unwrap();

    embedder.set_fail(true);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Failed
    );
    let record = embeddings::get_note_embedding(&db, note_id).await.unwrap().unwrap();
    assert_eq!(
        record.status,
        keepsake_storage::models::EmbeddingStatus::Failed
    );
    assert_eq!(record.text_hash, good.text_hash, "fingerprint untouched by failure");
    assert_eq!(record.embedding, good.embedding, "vector untouched by failure");

    // The stale fingerprint no longer matches the edited text, so the
    // next pass retries once the backend recovers.
    embedder.set_fail(false);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
}

#[tokio::test]
async fn empty_vector_counts_as_failure() {
    let db = test_db().await;
    let note_id = seed_note(&db, "t", "c", &[]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    embedder.push_vector(Vec::new());
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Failed
    );
    assert!(embeddings::get_note_embedding(&db, note_id).await.unwrap().is_none());
}

#[tokio::test]
async fn unready_backend_defers_without_recording_failure() {
    let db = test_db().await;
    let note_id = seed_note(&db, "t", "c", &[]).await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    embedder.set_ready(false);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::NotReady
    );
    assert_eq!(embedder.calls(), 0);
    assert!(embeddings::get_note_embedding(&db, note_id).await.unwrap().is_none());

    // Next pass succeeds once the backend comes back.
    embedder.set_ready(true);
    assert_eq!(
        pipeline.generate_note_text_embedding(note_id).await,
        EmbedOutcome::Stored
    );
}

#[tokio::test]
async fn missing_note_reports_missing_entity() {
    let db = test_db().await;
    let (pipeline, embedder, _) = pipeline(db);
    assert_eq!(
        pipeline.generate_note_text_embedding(12345).await,
        EmbedOutcome::MissingEntity
    );
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn empty_caption_is_skipped_entirely() {
    let db = test_db().await;
    let note_id = seed_note(&db, "t", "c", &[]).await;
    let image_id = seed_image(&db, note_id, "file://a.jpg", "   ").await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    assert_eq!(
        pipeline.generate_image_embedding(image_id).await,
        EmbedOutcome::SkippedEmptyCaption
    );
    assert_eq!(embedder.calls(), 0);
    assert!(embeddings::get_image_embedding(&db, image_id).await.unwrap().is_none());
}

#[tokio::test]
async fn full_pass_covers_text_and_captions() {
    let db = test_db().await;
    let note_id = seed_note(&db, "t", "c", &[]).await;
    seed_image(&db, note_id, "file://a.jpg", "A caption").await;
    seed_image(&db, note_id, "file://b.jpg", "").await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    let outcomes = pipeline.process_note_embeddings(note_id).await;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0], EmbedOutcome::Stored);
    assert!(outcomes.contains(&EmbedOutcome::SkippedEmptyCaption));
    assert_eq!(embedder.calls(), 2, "text plus one non-empty caption");
}

#[tokio::test]
async fn one_failing_caption_does_not_poison_the_pass() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Harbor walk", "Boats at dusk.", &[]).await;
    let good = seed_image(&db, note_id, "file://a.jpg", "Gulls on the railing").await;
    let bad = seed_image(&db, note_id, "file://b.jpg", "Blurry shot of the pier").await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    embedder.set_empty_for("Blurry");
    let outcomes = pipeline.process_note_embeddings(note_id).await;

    // Text first, then captions in image order.
    assert_eq!(
        outcomes,
        vec![EmbedOutcome::Stored, EmbedOutcome::Stored, EmbedOutcome::Failed]
    );
    assert!(embeddings::get_note_embedding(&db, note_id).await.unwrap().is_some());
    assert!(embeddings::get_image_embedding(&db, good).await.unwrap().is_some());
    assert!(
        embeddings::get_image_embedding(&db, bad).await.unwrap().is_none(),
        "a caption that never embedded gets no record"
    );
}

#[tokio::test]
async fn captions_embed_even_when_the_text_fails() {
    let db = test_db().await;
    let note_id = seed_note(&db, "Rainy morning", "Fog over the valley.", &[]).await;
    let image_id = seed_image(&db, note_id, "file://a.jpg", "Mist in the pines").await;
    let (pipeline, embedder, _) = pipeline(db.clone());

    embedder.set_empty_for("Fog over");
    let outcomes = pipeline.process_note_embeddings(note_id).await;

    assert_eq!(outcomes, vec![EmbedOutcome::Failed, EmbedOutcome::Stored]);
    assert!(embeddings::get_note_embedding(&db, note_id).await.unwrap().is_none());
    assert!(embeddings::get_image_embedding(&db, image_id).await.unwrap().is_some());
}
