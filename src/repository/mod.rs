//! Repository layer for document persistence.
//!
//! The pipeline talks to storage only through [`DocumentStore`]; the SQLite
//! implementation lives in [`document`].

mod document;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::models::{Document, NewDocument};

pub use document::SqliteDocumentStore;

/// Errors raised by document stores.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Filters for [`DocumentStore::search`]. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    /// Case-insensitive substring matched against title, content and summary.
    pub text: Option<String>,
    /// Matches documents carrying at least one of these tags.
    pub tags: Vec<String>,
}

impl DocumentQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Lowercased search text, ignoring blank input.
    pub(crate) fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

/// Persistent storage for annotated documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document and return its identifier.
    async fn insert(&self, document: &NewDocument) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Documents matching `query`, newest first.
    async fn search(&self, query: &DocumentQuery) -> Result<Vec<Document>>;

    /// A page of documents, newest first.
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Document>>;

    async fn count(&self) -> Result<u64>;

    /// Every tag in use with its document count, most used first.
    async fn all_tags(&self) -> Result<Vec<(String, u64)>>;
}

/// Open a connection with the pragmas every store connection uses.
pub(crate) fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 30000;
    "#,
    )?;
    Ok(conn)
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime("2024-03-01T12:30:00.000000Z");
        assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:00+00:00");
        assert_eq!(parse_datetime("not a date"), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_query_needle() {
        assert_eq!(DocumentQuery::default().needle(), None);
        assert_eq!(DocumentQuery::text("   ").needle(), None);
        assert_eq!(
            DocumentQuery::text(" Budget ").needle().as_deref(),
            Some("budget")
        );
    }
}
