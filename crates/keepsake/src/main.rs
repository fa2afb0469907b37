// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keepsake - a personal memory journal with semantic recall.
//!
//! Binary entry point. Each invocation runs one command against the
//! journal database; embedding and script generation run inline before
//! exit rather than behind the debounce, since the process is
//! short-lived.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use keepsake_memory::service::MemoryOptions;
use keepsake_memory::{ModelGateway, MemoryService};
use keepsake_ollama::{OllamaCompleter, OllamaEmbedder};
use keepsake_storage::models::NewNote;
use keepsake_storage::queries::{images, notes, stats};
use keepsake_storage::Database;
use tracing_subscriber::EnvFilter;

/// Keepsake - a personal memory journal with semantic recall.
#[derive(Parser, Debug)]
#[command(name = "keepsake", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new journal note.
    Add {
        title: String,
        content: String,
        /// Tags for the note (repeatable).
        #[arg(short, long)]
        tag: Vec<String>,
        /// Reference to an attached audio recording.
        #[arg(long)]
        audio: Option<String>,
        /// Attach an image as uri=caption (repeatable).
        #[arg(long)]
        image: Vec<String>,
    },
    /// Replace a note's title, content, and tags.
    Edit {
        id: i64,
        title: String,
        content: String,
        #[arg(short, long)]
        tag: Vec<String>,
        #[arg(long)]
        audio: Option<String>,
    },
    /// Show one note with its tags, images, and recall script.
    Show { id: i64 },
    /// List recent notes.
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Exact substring search over titles and content.
    Find { needle: String },
    /// Semantic search over the journal.
    Search { query: String },
    /// Delete a note and everything attached to it.
    Delete { id: i64 },
    /// Present a reminiscence session.
    Reminisce,
    /// Show journal counters and backend readiness.
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match keepsake_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            keepsake_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    // RUST_LOG wins; the configured level is the fallback.
    let fallback = format!("keepsake={},warn", config.journal.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_path = std::path::Path::new(&config.storage.database_path);
    let db = match Database::open(db_path, config.storage.wal_mode).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("keepsake: failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let gateway = Arc::new(ModelGateway::new(
        Arc::new(OllamaEmbedder::new(
            &config.models.base_url,
            &config.models.embedding_model,
        )),
        Arc::new(OllamaCompleter::new(
            &config.models.base_url,
            &config.models.narration_model,
        )),
    ));
    let service = MemoryService::new(
        db.clone(),
        Arc::clone(&gateway),
        MemoryOptions {
            embedding_dim: config.models.embedding_dim,
            similarity_floor: config.memory.similarity_floor,
            relative_threshold: config.memory.relative_threshold,
            top_k: config.memory.top_k,
            debounce_delay: std::time::Duration::from_millis(config.memory.debounce_delay_ms),
            session_size: config.reminiscence.session_size,
            script_temperature: config.reminiscence.script_temperature,
            script_max_tokens: config.reminiscence.script_max_tokens,
        },
    );

    let result = match cli.command {
        Some(command) => run_command(command, &db, &service, &gateway).await,
        None => {
            println!("keepsake: use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("keepsake: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_command(
    command: Commands,
    db: &Database,
    service: &MemoryService,
    gateway: &ModelGateway,
) -> Result<(), keepsake_core::KeepsakeError> {
    match command {
        Commands::Add {
            title,
            content,
            tag,
            audio,
            image,
        } => {
            let id = notes::create_note(
                db,
                &NewNote {
                    title,
                    content,
                    audio_ref: audio,
                    tags: tag,
                },
            )
            .await?;
            for attachment in &image {
                let (uri, caption) =
                    attachment.split_once('=').unwrap_or((attachment.as_str(), ""));
                images::add_image(db, id, uri, caption).await?;
            }
            let outcomes = service.process_now(id).await;
            tracing::debug!(note_id = id, ?outcomes, "inline embedding pass");
            println!("saved note {id}");
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            content,
            tag,
            audio,
        } => {
            notes::update_note(
                db,
                id,
                &NewNote {
                    title,
                    content,
                    audio_ref: audio,
                    tags: tag,
                },
            )
            .await?;
            let outcomes = service.process_now(id).await;
            tracing::debug!(note_id = id, ?outcomes, "inline embedding pass");
            println!("updated note {id}");
            Ok(())
        }
        Commands::Show { id } => {
            let details = notes::get_note_details(db, id)
                .await?
                .ok_or(keepsake_core::KeepsakeError::NotFound { entity: "note", id })?;
            println!("#{} {}", details.note.id, details.note.title);
            println!("  created: {}", details.note.created_at);
            if !details.tags.is_empty() {
                println!("  tags: {}", details.tags.join(", "));
            }
            if let Some(audio) = &details.note.audio_ref {
                println!("  audio: {audio}");
            }
            for image in &details.images {
                println!("  image: {} ({})", image.uri, image.description);
            }
            println!("\n{}", details.note.content);
            if let Some(script) = &details.note.recall_script {
                println!("\nrecall script:\n{script}");
            }
            Ok(())
        }
        Commands::List { limit } => {
            for note in notes::list_notes(db, limit).await? {
                println!("#{} {} ({})", note.id, note.title, note.created_at);
            }
            Ok(())
        }
        Commands::Find { needle } => {
            for note in notes::search_notes_like(db, &needle, 50).await? {
                println!("#{} {}", note.id, note.title);
            }
            Ok(())
        }
        Commands::Search { query } => {
            let matches = service.retrieve(&query).await;
            if matches.is_empty() {
                println!("no matching memories");
            }
            for hit in matches {
                println!(
                    "#{} {} (similarity {:.2}, matched {})",
                    hit.note_id,
                    hit.title,
                    hit.score,
                    match hit.matched {
                        keepsake_memory::MatchKind::Text => "text",
                        keepsake_memory::MatchKind::Image => "an image caption",
                    }
                );
            }
            Ok(())
        }
        Commands::Delete { id } => {
            if notes::delete_note(db, id).await? {
                println!("deleted note {id}");
            } else {
                println!("note {id} not found");
            }
            Ok(())
        }
        Commands::Reminisce => {
            let mut rng = rand::thread_rng();
            let session = service.reminisce(&mut rng).await;
            if session.is_empty() {
                println!("nothing to reminisce about yet");
            }
            for details in session {
                println!("== {} ==", details.note.title);
                match &details.note.recall_script {
                    Some(script) => println!("{script}"),
                    None => println!("{}", details.note.content),
                }
                for image in &details.images {
                    println!("  [photo] {}", image.uri);
                }
                println!();
            }
            Ok(())
        }
        Commands::Status => {
            let stats = stats::journal_stats(db).await?;
            println!("notes: {}", stats.notes);
            println!("images: {}", stats.images);
            println!(
                "note embeddings: {} completed, {} failed",
                stats.note_embeddings_completed, stats.note_embeddings_failed
            );
            println!(
                "caption embeddings: {} completed, {} failed",
                stats.image_embeddings_completed, stats.image_embeddings_failed
            );
            println!("recall scripts ready: {}", stats.scripts_ready);
            println!(
                "embedding backend: {}",
                if gateway.embedder_ready().await { "ready" } else { "unreachable" }
            );
            println!(
                "narration backend: {}",
                if gateway.completer_ready().await { "ready" } else { "unreachable" }
            );
            Ok(())
        }
    }
}
