// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminiscence session selection.
//!
//! Picks which memories to resurface. Scoring favors notes with images,
//! older notes, longer notes, and above all notes that have not been
//! shown recently; notes without a generated recall script are pushed to
//! the back until the script pipeline catches up. The top-scored picks
//! are shuffled before presentation so a session does not always open
//! with the same memory.

use chrono::{DateTime, Utc};
use keepsake_core::parse_iso;
use keepsake_storage::models::NoteDetails;
use keepsake_storage::queries::notes;
use keepsake_storage::Database;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

/// Flat bonus for notes carrying at least one image.
const IMAGE_WEIGHT: f32 = 50.0;
/// Per-day bonus for note age; old memories surface more.
const AGE_WEIGHT_PER_DAY: f32 = 0.5;
/// Per-character bonus for content length.
const LENGTH_WEIGHT_PER_CHAR: f32 = 0.01;
/// Per-day bonus since the note was last shown. Dominates the score so
/// rotation wins over every other factor.
const SHOWN_WEIGHT_PER_DAY: f32 = 2.0;
/// Stand-in day count for notes that have never been shown.
const NEVER_SHOWN_DAYS: f32 = 9999.0;
/// Bonus for having a ready recall script.
const SCRIPT_READY_BONUS: f32 = 10.0;
/// Penalty for a missing script; keeps unscripted notes out of sessions
/// unless nothing else is available.
const SCRIPT_MISSING_PENALTY: f32 = -100.0;

fn days_between(earlier: &str, now: DateTime<Utc>) -> f32 {
    match parse_iso(earlier) {
        Some(ts) => ((now - ts).num_seconds().max(0) as f32) / 86_400.0,
        None => 0.0,
    }
}

/// Score one note for session selection.
pub fn score_note(details: &NoteDetails, now: DateTime<Utc>) -> f32 {
    let mut score = 0.0f32;
    if !details.images.is_empty() {
        score += IMAGE_WEIGHT;
    }
    score += AGE_WEIGHT_PER_DAY * days_between(&details.note.created_at, now);
    score += LENGTH_WEIGHT_PER_CHAR * details.note.content.chars().count() as f32;
    score += SHOWN_WEIGHT_PER_DAY
        * match &details.note.last_shown_at {
            Some(ts) => days_between(ts, now),
            None => NEVER_SHOWN_DAYS,
        };
    score += if details.note.recall_script.is_some() {
        SCRIPT_READY_BONUS
    } else {
        SCRIPT_MISSING_PENALTY
    };
    score
}

pub struct ReminiscenceSelector {
    db: Database,
    session_size: usize,
}

impl ReminiscenceSelector {
    pub fn new(db: Database, session_size: usize) -> Self {
        Self { db, session_size }
    }

    /// Pick a session's worth of memories from the whole journal.
    pub async fn select_session(&self, rng: &mut impl Rng) -> Vec<NoteDetails> {
        let pool = match notes::list_note_details(&self.db).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "failed to load reminiscence candidates");
                return Vec::new();
            }
        };
        select_from_pool(pool, self.session_size, rng)
    }

    /// Record that the given notes were just shown.
    ///
    /// Individual failures are logged and skipped; a missed timestamp
    /// only means the note rotates back a little sooner.
    pub async fn mark_shown(&self, note_ids: &[i64]) {
        for &id in note_ids {
            if let Err(e) = notes::touch_last_shown(&self.db, id).await {
                warn!(note_id = id, error = %e, "failed to record last-shown timestamp");
            }
        }
    }
}

/// Rank the pool by score, keep the top `count`, and shuffle them.
pub fn select_from_pool(
    mut pool: Vec<NoteDetails>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<NoteDetails> {
    let now = Utc::now();
    if pool.len() > count {
        pool.sort_by(|a, b| {
            score_note(b, now)
                .partial_cmp(&score_note(a, now))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pool.truncate(count);
    }
    pool.shuffle(rng);
    pool
}
