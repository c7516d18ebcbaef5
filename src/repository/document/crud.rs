//! Insert and lookup operations.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{row_to_document, SqliteDocumentStore, DOCUMENT_COLUMNS};
use crate::models::{Document, NewDocument};
use crate::repository::Result;

/// Fixed-width UTC timestamps so text ordering matches time ordering.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SqliteDocumentStore {
    /// Insert a document under a fresh UUID and return the identifier.
    pub(crate) fn insert_sync(&self, document: &NewDocument) -> Result<String> {
        let conn = self.connect()?;
        let id = uuid::Uuid::new_v4().to_string();
        let tags = serde_json::to_string(&document.tags)?;
        let source_file = document
            .source_file
            .as_ref()
            .map(|p| p.display().to_string());

        conn.execute(
            r#"INSERT INTO documents
               (id, title, content, summary, tags, language, created_at, updated_at, source_file)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                id,
                document.title,
                document.content,
                document.summary,
                tags,
                document.language.code(),
                format_timestamp(&document.created_at),
                format_timestamp(&document.updated_at),
                source_file,
            ],
        )?;

        debug!("Inserted document {} ({})", id, document.title);
        Ok(id)
    }

    /// Get a document by ID.
    pub(crate) fn get_sync(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {} FROM documents WHERE id = ?", DOCUMENT_COLUMNS);
        let doc = conn
            .query_row(&sql, params![id], row_to_document)
            .optional()?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{new_document, setup};
    use super::*;
    use crate::models::{Annotation, ExtractedText, Language};
    use std::path::PathBuf;

    #[test]
    fn test_insert_and_get() {
        let (_dir, store) = setup();
        let new_doc = new_document("Budget memo", "Line items for 2024", &["finance", "memo"]);
        let id = store.insert_sync(&new_doc).unwrap();

        let doc = store.get_sync(&id).unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.title, "Budget memo");
        assert_eq!(doc.content, "Line items for 2024");
        assert_eq!(doc.summary, "Summary of Budget memo");
        assert_eq!(doc.tags, vec!["finance", "memo"]);
        assert_eq!(doc.language, Language::English);
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(
            format_timestamp(&doc.created_at),
            format_timestamp(&new_doc.created_at)
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let (_dir, store) = setup();
        let doc = new_document("Same", "content", &[]);
        let first = store.insert_sync(&doc).unwrap();
        let second = store.insert_sync(&doc).unwrap();
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_source_file_and_language_preserved() {
        let (_dir, store) = setup();
        let annotation = Annotation::degraded(Language::Vietnamese);
        let new_doc = NewDocument::new(
            None,
            &ExtractedText::raw("Đây là tiếng Việt"),
            &annotation,
            Some(PathBuf::from("/uploads/ghi-chu.txt")),
        );
        let id = store.insert_sync(&new_doc).unwrap();

        let doc = store.get_sync(&id).unwrap().unwrap();
        assert_eq!(doc.title, "Untitled Document");
        assert_eq!(doc.language, Language::Vietnamese);
        assert_eq!(doc.summary, "");
        assert!(doc.tags.is_empty());
        assert_eq!(doc.source_file, Some(PathBuf::from("/uploads/ghi-chu.txt")));
    }

    #[test]
    fn test_get_missing() {
        let (_dir, store) = setup();
        assert!(store.get_sync("no-such-id").unwrap().is_none());
    }
}
