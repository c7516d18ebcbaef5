//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod detect;
mod documents;
mod helpers;
mod ingest;
mod init;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, Config, LoadOptions, Settings};
use crate::llm::{LlmClient, PromptError, PromptSet, TextGenerator};
use crate::models::Language;
use crate::repository::{DocumentStore, SqliteDocumentStore};
use crate::services::DocumentService;

#[derive(Parser)]
#[command(name = "dochub")]
#[command(about = "Document ingestion with AI summaries and tags")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    /// Can be a directory containing dochub.db or a .db file directly.
    #[arg(long, short = 'd', global = true, env = "DOCHUB_DATA")]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse a `--language` tag; only languages with prompts are accepted.
fn parse_language(code: &str) -> Result<Language, PromptError> {
    PromptSet::for_code(code).map(|prompts| prompts.language)
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Extract, annotate and store documents
    Ingest {
        /// Files to ingest; a directory ingests the supported files directly inside it
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Document title (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
        /// Annotate in this language (en or vi) instead of detecting it
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
    },

    /// Create a document from text in a file or on stdin
    Create {
        /// Document title
        #[arg(short, long)]
        title: String,
        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Annotate in this language (en or vi) instead of detecting it
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
    },

    /// Show a stored document
    Show {
        /// Document ID
        id: String,
    },

    /// List stored documents, newest first
    List {
        /// Number of documents to skip
        #[arg(long, default_value = "0")]
        skip: usize,
        /// Maximum number of documents to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Search documents by text and tags
    Search {
        /// Text to find in title, content or summary (case-insensitive)
        query: Option<String>,
        /// Match documents carrying any of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List tags with document counts
    Tags,

    /// Detect the language of a file without storing it
    Detect {
        /// File to inspect
        path: PathBuf,
    },

    /// Show AI provider and database status
    Status,
}

/// Open the configured store.
fn open_store(settings: &Settings) -> anyhow::Result<Arc<SqliteDocumentStore>> {
    Ok(Arc::new(SqliteDocumentStore::open(
        &settings.database_path(),
    )?))
}

/// Build the ingestion pipeline from settings and config.
fn build_service(settings: &Settings, config: &Config) -> anyhow::Result<DocumentService> {
    let generator: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config.llm.clone())?);
    let store: Arc<dyn DocumentStore> = open_store(settings)?;
    Ok(DocumentService::new(
        generator,
        Some(store),
        config.annotation,
    ))
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Ingest {
            paths,
            title,
            language,
        } => {
            ingest::cmd_ingest(
                &settings,
                &config,
                &paths,
                title,
                language,
            )
            .await
        }
        Commands::Create {
            title,
            file,
            language,
        } => {
            ingest::cmd_create(
                &settings,
                &config,
                &title,
                file.as_deref(),
                language,
            )
            .await
        }
        Commands::Show { id } => documents::cmd_show(&settings, &id).await,
        Commands::List { skip, limit } => documents::cmd_list(&settings, skip, limit).await,
        Commands::Search { query, tags } => documents::cmd_search(&settings, query, tags).await,
        Commands::Tags => documents::cmd_tags(&settings).await,
        Commands::Detect { path } => detect::cmd_detect(&path).await,
        Commands::Status => status::cmd_status(&settings, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::try_parse_from([
            "dochub", "ingest", "a.txt", "b.pdf", "--language", "vi", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Ingest {
                paths, language, ..
            } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(language, Some(Language::Vietnamese));
            }
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_parse_search_tags() {
        let cli =
            Cli::try_parse_from(["dochub", "search", "budget", "--tag", "memo", "-t", "legal"])
                .unwrap();
        match cli.command {
            Commands::Search { query, tags } => {
                assert_eq!(query.as_deref(), Some("budget"));
                assert_eq!(tags, vec!["memo", "legal"]);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = Cli::try_parse_from(["dochub", "create", "-t", "T", "--language", "fr"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unsupported language: fr"));
    }

    #[test]
    fn test_ingest_requires_path() {
        assert!(Cli::try_parse_from(["dochub", "ingest"]).is_err());
    }
}
