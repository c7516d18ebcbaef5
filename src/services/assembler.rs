//! Turns extracted text and its annotation into a stored document.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use super::PipelineError;
use crate::models::{Annotation, Document, ExtractedText, NewDocument};
use crate::repository::DocumentStore;

/// Builds document records and hands them to the configured store.
#[derive(Clone)]
pub struct DocumentAssembler {
    store: Option<Arc<dyn DocumentStore>>,
}

impl DocumentAssembler {
    pub fn new(store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { store }
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Assemble and insert a document, returning it with its new identifier.
    pub async fn assemble(
        &self,
        title: Option<&str>,
        content: &ExtractedText,
        annotation: &Annotation,
        source_file: Option<PathBuf>,
    ) -> Result<Document, PipelineError> {
        let store = self
            .store
            .as_ref()
            .ok_or(PipelineError::PersistenceUnavailable)?;

        let record = NewDocument::new(title, content, annotation, source_file);
        let id = store.insert(&record).await?;
        info!("Stored document {} ({})", id, record.title);

        Ok(record.with_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::repository::SqliteDocumentStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_store_is_reported() {
        let assembler = DocumentAssembler::new(None);
        assert!(!assembler.has_store());
        let err = assembler
            .assemble(
                Some("Title"),
                &ExtractedText::raw("body"),
                &Annotation::degraded(Language::English),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::PersistenceUnavailable));
    }

    #[tokio::test]
    async fn test_assemble_stores_record() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteDocumentStore::open(&dir.path().join("db.sqlite")).unwrap());
        let assembler = DocumentAssembler::new(Some(store.clone()));

        let annotation = Annotation {
            summary: "Short".to_string(),
            tags: vec!["one".to_string()],
            language: Language::English,
        };
        let doc = assembler
            .assemble(Some("   "), &ExtractedText::raw("body"), &annotation, None)
            .await
            .unwrap();

        assert_eq!(doc.title, "Untitled Document");
        assert_eq!(doc.created_at, doc.updated_at);
        let stored = store.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.summary, "Short");
        assert_eq!(stored.tags, vec!["one"]);
    }
}
