// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content fingerprints for change detection.
//!
//! The embedding pipeline hashes the exact text it would embed and
//! compares against the stored record; an identical hash means zero
//! inference calls and zero writes for that pass.

use keepsake_storage::models::NoteDetails;
use sha2::{Digest, Sha256};

/// SHA-256 of the input, hex-encoded lowercase.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compose the canonical embeddable text for a note.
///
/// Tags lead so short notes still carry their topical signal; the tag
/// line is omitted entirely when the note has no tags.
pub fn compose_note_text(details: &NoteDetails) -> String {
    let mut text = String::new();
    if !details.tags.is_empty() {
        text.push_str("Tags: ");
        text.push_str(&details.tags.join(", "));
        text.push_str("\n\n");
    }
    text.push_str(&details.note.title);
    text.push_str("\n\n");
    text.push_str(&details.note.content);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_storage::models::{Note, NoteDetails};

    fn details(title: &str, content: &str, tags: &[&str]) -> NoteDetails {
        NoteDetails {
            note: Note {
                id: 1,
                title: title.to_string(),
                content: content.to_string(),
                audio_ref: None,
                recall_script: None,
                last_shown_at: None,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
                updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            images: vec![],
        }
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = fingerprint("hello");
        assert_eq!(a, fingerprint("hello"));
        assert_ne!(a, fingerprint("hello "));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn composed_text_includes_tags_when_present() {
        let text = compose_note_text(&details("Title", "Body", &["a", "b"]));
        assert_eq!(text, "Tags: a, b\n\nTitle\n\nBody");
    }

    #[test]
    fn composed_text_omits_tag_line_when_empty() {
        let text = compose_note_text(&details("Title", "Body", &[]));
        assert_eq!(text, "Title\n\nBody");
    }

    #[test]
    fn tag_changes_alter_the_fingerprint() {
        let with = fingerprint(&compose_note_text(&details("T", "C", &["x"])));
        let without = fingerprint(&compose_note_text(&details("T", "C", &[])));
        assert_ne!(with, without);
    }
}
