//! SQLite document store.
//!
//! Split into submodules:
//! - `schema`: table and index creation
//! - `crud`: insert and lookup by identifier
//! - `query`: search and listing
//! - `stats`: counts and tag usage

mod crud;
mod query;
mod schema;
mod stats;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, Row};
use tracing::warn;

use super::{parse_datetime, DocumentQuery, DocumentStore, RepositoryError, Result};
use crate::models::{Document, Language, NewDocument};

/// Columns selected for every document read, in `row_to_document` order.
pub(crate) const DOCUMENT_COLUMNS: &str =
    "id, title, content, summary, tags, language, created_at, updated_at, source_file";

/// SQLite-backed document store. Opens a connection per operation.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db_path: PathBuf,
}

impl SqliteDocumentStore {
    /// Open (creating if needed) the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Run a synchronous store operation on the blocking thread pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteDocumentStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| RepositoryError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, document: &NewDocument) -> Result<String> {
        let document = document.clone();
        self.blocking(move |store| store.insert_sync(&document))
            .await
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let id = id.to_string();
        self.blocking(move |store| store.get_sync(&id)).await
    }

    async fn search(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let query = query.clone();
        self.blocking(move |store| store.search_sync(&query)).await
    }

    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Document>> {
        self.blocking(move |store| store.list_sync(skip, limit))
            .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|store| store.count_sync()).await
    }

    async fn all_tags(&self) -> Result<Vec<(String, u64)>> {
        self.blocking(|store| store.all_tags_sync()).await
    }
}

/// Map a row selected with [`DOCUMENT_COLUMNS`] to a document.
///
/// Unreadable tags or language codes fall back to defaults with a warning so
/// that one damaged row does not hide the rest of a listing.
pub(crate) fn row_to_document(row: &Row) -> rusqlite::Result<Document> {
    let id: String = row.get("id")?;
    let tags_json: String = row.get("tags")?;
    let language: String = row.get("language")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let source_file: Option<String> = row.get("source_file")?;

    let tags = serde_json::from_str(&tags_json).unwrap_or_else(|e| {
        warn!("Document {} has unreadable tags {:?}: {}", id, tags_json, e);
        Vec::new()
    });
    let language = Language::from_code(&language).unwrap_or_else(|| {
        warn!("Document {} has unknown language {:?}", id, language);
        Language::default()
    });

    Ok(Document {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        tags,
        language,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
        source_file: source_file.map(PathBuf::from),
    })
}
