// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall-script generation.
//!
//! Turns a saved note into a short second-person narration used to
//! open a reminiscence session. Scripts regenerate whenever the note is
//! edited; an empty or failed completion never clobbers a script that
//! already exists.

use std::sync::Arc;

use keepsake_core::SamplingParams;
use keepsake_storage::models::NoteDetails;
use keepsake_storage::queries::notes;
use keepsake_storage::Database;
use metrics::counter;
use tracing::{debug, warn};

use crate::gateway::ModelGateway;

const SCRIPT_SYSTEM_PROMPT: &str = "You help someone revisit their own memories. \
Given the details of a journal entry, write a short, warm narration in the second \
person that helps them recall the moment. Two to four sentences. Mention concrete \
details from the entry. Do not invent facts that are not in the entry. Do not \
mention that this is a journal or a note.";

pub struct ScriptPipeline {
    db: Database,
    gateway: Arc<ModelGateway>,
    temperature: f32,
    max_tokens: u32,
}

impl ScriptPipeline {
    pub fn new(db: Database, gateway: Arc<ModelGateway>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            db,
            gateway,
            temperature,
            max_tokens,
        }
    }

    /// Generate and store a recall script for a note.
    ///
    /// Failure-absorbing like the embedding pass: errors log and leave
    /// any existing script in place.
    pub async fn generate_recall_script(&self, note_id: i64) {
        let details = match notes::get_note_details(&self.db, note_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                debug!(note_id, "note deleted before script generation");
                return;
            }
            Err(e) => {
                warn!(note_id, error = %e, "failed to load note for script generation");
                return;
            }
        };

        if !self.gateway.completer_ready().await {
            warn!(note_id, "narration backend not ready, skipping script");
            return;
        }

        let params = SamplingParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..SamplingParams::default()
        };
        let prompt = build_script_prompt(&details);

        let script = match self.gateway.complete(SCRIPT_SYSTEM_PROMPT, &prompt, &params).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(note_id, error = %e, "script generation failed");
                counter!("keepsake_scripts_failed_total").increment(1);
                return;
            }
        };

        if script.is_empty() {
            warn!(note_id, "model returned an empty script, keeping previous one");
            return;
        }

        match notes::set_recall_script(&self.db, note_id, &script).await {
            Ok(true) => {
                counter!("keepsake_scripts_generated_total").increment(1);
            }
            Ok(false) => debug!(note_id, "note deleted before script store"),
            Err(e) => warn!(note_id, error = %e, "failed to store recall script"),
        }
    }
}

/// Render the user prompt for one note.
fn build_script_prompt(details: &NoteDetails) -> String {
    let mut prompt = format!(
        "Title: {}\nWritten: {}\n",
        details.note.title, details.note.created_at
    );
    if !details.tags.is_empty() {
        prompt.push_str(&format!("Tags: {}\n", details.tags.join(", ")));
    }
    prompt.push_str(&format!("Entry:\n{}\n", details.note.content));
    let captions: Vec<&str> = details
        .images
        .iter()
        .map(|i| i.description.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !captions.is_empty() {
        prompt.push_str("Photos from that day:\n");
        for caption in captions {
            prompt.push_str(&format!("- {caption}\n"));
        }
    }
    prompt
}
