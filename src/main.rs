//! # Groundwork CLI (`gw`)
//!
//! The `gw` binary is the operational interface for Groundwork. It
//! provides commands for database initialization, document ingestion,
//! retrieval queries, and corpus statistics.
//!
//! ## Usage
//!
//! ```bash
//! gw --config ./config/gw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gw init` | Create the SQLite database and run schema migrations |
//! | `gw ingest <path>` | Chunk, embed, and store a document for a team |
//! | `gw ask "<query>"` | Build the retrieval context for a query |
//! | `gw docs` | List a team's documents with processing status |
//! | `gw delete <id>` | Delete a document and its chunks |
//! | `gw stats` | Print corpus statistics |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use groundwork::config;
use groundwork::db;
use groundwork::embedding::create_provider;
use groundwork::engine::Engine;
use groundwork::ingest::DocumentSource;
use groundwork::migrate;
use groundwork::sqlite_store::SqliteStore;
use groundwork::stats;

/// Groundwork CLI — retrieval-augmented grounding over team document
/// corpora.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/gw.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "gw",
    about = "Groundwork — retrieval-augmented grounding over team document corpora",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gw.toml")]
    config: PathBuf,

    /// Team the command operates on.
    #[arg(long, global = true, default_value = "default")]
    team: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables.
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Ingest a document from a local file.
    ///
    /// Reads the file, chunks and embeds its text, and stores the result
    /// for the team. Re-ingesting the same file replaces the previous
    /// version rather than duplicating it.
    Ingest {
        /// Path to the document file.
        path: PathBuf,

        /// Source identifier; defaults to the file path.
        #[arg(long)]
        source_id: Option<String>,

        /// Folder label recorded with the document; defaults to the
        /// parent directory name.
        #[arg(long)]
        folder: Option<String>,
    },

    /// Build the retrieval context for a query and print it.
    Ask {
        /// The query string.
        query: String,

        /// Maximum number of chunks to include.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the team's documents with their processing status.
    Docs,

    /// Delete a document and all of its chunks.
    Delete {
        /// Document id.
        id: String,
    },

    /// Print corpus statistics.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            path,
            source_id,
            folder,
        } => {
            let engine = build_engine(&cfg).await?;
            let source = source_from_path(&path, source_id, folder)?;
            let name = source.name.clone();
            let processed = engine.process_document(&cli.team, source).await?;
            println!(
                "Ingested {} — {} chunks, {} embeddings (document {})",
                name, processed.chunk_count, processed.embedding_count, processed.document_id
            );
        }
        Commands::Ask { query, limit } => {
            let engine = build_engine(&cfg).await?;
            let bundle = engine.create_context(&cli.team, &query, limit).await?;
            if bundle.has_relevant_context {
                println!("{}", bundle.context_text);
                println!();
                println!("Sources: {}", bundle.included_documents.join(", "));
            } else {
                println!("No relevant context found.");
            }
        }
        Commands::Docs => {
            let engine = build_engine(&cfg).await?;
            let docs = engine.list_documents(&cli.team).await?;
            if docs.is_empty() {
                println!("No documents for team '{}'.", cli.team);
            } else {
                println!(
                    "{:<38} {:<12} {:>7} {:>9}  NAME",
                    "ID", "STATUS", "CHUNKS", "CHARS"
                );
                for d in docs {
                    println!(
                        "{:<38} {:<12} {:>7} {:>9}  {}",
                        d.id,
                        d.status.as_str(),
                        d.chunk_count,
                        d.char_length,
                        d.name
                    );
                }
            }
        }
        Commands::Delete { id } => {
            let engine = build_engine(&cfg).await?;
            engine.delete_document(&id).await?;
            println!("Deleted document {}.", id);
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}

/// Connect to SQLite and assemble an engine from the configured
/// embedding provider.
async fn build_engine(cfg: &config::Config) -> Result<Engine> {
    let pool = db::connect(cfg).await?;
    migrate::run_migrations(&pool).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let provider = Arc::from(create_provider(&cfg.embedding)?);
    Ok(Engine::new(store, provider, cfg.clone()))
}

/// Build a [`DocumentSource`] from a local file.
fn source_from_path(
    path: &PathBuf,
    source_id: Option<String>,
    folder: Option<String>,
) -> Result<DocumentSource> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let folder_label = folder.unwrap_or_else(|| {
        path.parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string())
    });

    let media_type = match path.extension().and_then(|e| e.to_str()) {
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "text/plain",
    }
    .to_string();

    let last_modified: DateTime<Utc> = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(DocumentSource {
        source_id: source_id.unwrap_or_else(|| path.display().to_string()),
        name,
        media_type,
        folder_label,
        text,
        last_modified,
    })
}
