//! Service layer for document ingestion.
//!
//! [`DocumentService`] wires extraction, language classification,
//! annotation and storage into the ingestion entry points. It is separated
//! from UI concerns; batch ingestion reports progress through events.

pub mod annotation;
pub mod assembler;
pub mod language;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::extract::{self, ContentExtractor, ExtractionError};
use crate::llm::TextGenerator;
use crate::models::{Document, DocumentFormat, ExtractedText, Language};
use crate::repository::{DocumentStore, RepositoryError};

pub use annotation::{
    AnnotationLimits, AnnotationReport, AnnotationStep, Annotator, Degradation, Generation,
};
pub use assembler::DocumentAssembler;

/// Errors that stop a document from being ingested.
///
/// AI failures are not among them: they degrade the annotation instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text: {0}")]
    ExtractionFailure(String),

    #[error("Document contains no text")]
    EmptyContent,

    #[error("No document store configured")]
    PersistenceUnavailable,

    #[error("Storage error: {0}")]
    Store(#[from] RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(ext) => Self::UnsupportedFormat(ext),
            ExtractionError::ExtractionFailed(msg) => Self::ExtractionFailure(msg),
            ExtractionError::Io(e) => Self::Io(e),
        }
    }
}

/// Caller-supplied metadata for one ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub title: Option<String>,
    /// Skip classification and annotate in this language.
    pub language: Option<Language>,
}

impl IngestOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            language: None,
        }
    }
}

/// A stored document and the annotation steps that degraded on the way.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub document: Document,
    pub degradations: Vec<Degradation>,
}

/// Events emitted during batch ingestion.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    Started { total_files: usize },
    FileStarted { path: PathBuf },
    FileStored {
        path: PathBuf,
        document_id: String,
        title: String,
        degradations: Vec<Degradation>,
    },
    FileFailed { path: PathBuf, error: String },
    Complete { succeeded: usize, failed: usize },
}

/// Result of batch ingestion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Stored documents with at least one degraded annotation step.
    pub degraded: usize,
}

/// Ingestion pipeline: extract, classify, annotate, store.
#[derive(Clone)]
pub struct DocumentService {
    extractor: ContentExtractor,
    annotator: Annotator,
    assembler: DocumentAssembler,
}

impl DocumentService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Option<Arc<dyn DocumentStore>>,
        limits: AnnotationLimits,
    ) -> Self {
        Self {
            extractor: ContentExtractor::new(),
            annotator: Annotator::new(generator, limits),
            assembler: DocumentAssembler::new(store),
        }
    }

    /// Ingest a file, resolving its format from the extension.
    ///
    /// The path is recorded on the stored document.
    pub async fn ingest_file(
        &self,
        path: &Path,
        options: &IngestOptions,
    ) -> Result<IngestOutcome, PipelineError> {
        info!("Ingesting file: {}", path.display());
        let extracted = self.extractor.extract_file(path).await?;
        self.process(extracted, options, Some(path.to_path_buf()))
            .await
    }

    /// Ingest an in-memory payload of a declared format.
    pub async fn ingest_bytes(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        options: &IngestOptions,
    ) -> Result<IngestOutcome, PipelineError> {
        let extracted = self.extractor.extract(bytes, format)?;
        self.process(extracted, options, None).await
    }

    /// Ingest text supplied directly by the caller.
    pub async fn ingest_text(
        &self,
        text: &str,
        options: &IngestOptions,
    ) -> Result<IngestOutcome, PipelineError> {
        self.process(ExtractedText::raw(text), options, None).await
    }

    async fn process(
        &self,
        extracted: ExtractedText,
        options: &IngestOptions,
        source_file: Option<PathBuf>,
    ) -> Result<IngestOutcome, PipelineError> {
        if extracted.is_blank() {
            return Err(PipelineError::EmptyContent);
        }
        // Fail before spending AI calls on a document that cannot be stored
        if !self.assembler.has_store() {
            return Err(PipelineError::PersistenceUnavailable);
        }

        let report = self
            .annotator
            .annotate(extracted.as_str(), options.language)
            .await;
        debug!(
            language = report.annotation.language.code(),
            tags = report.annotation.tags.len(),
            degraded = report.is_degraded(),
            "Annotation finished"
        );

        let document = self
            .assembler
            .assemble(
                options.title.as_deref(),
                &extracted,
                &report.annotation,
                source_file,
            )
            .await?;

        Ok(IngestOutcome {
            document,
            degradations: report.degradations,
        })
    }

    /// Ingest several files sequentially, reporting progress on `event_tx`.
    ///
    /// Files without an explicit title are titled by their file stem. A
    /// failing file is reported and skipped.
    pub async fn ingest_paths(
        &self,
        paths: &[PathBuf],
        options: &IngestOptions,
        event_tx: mpsc::Sender<IngestEvent>,
    ) -> IngestSummary {
        let _ = event_tx
            .send(IngestEvent::Started {
                total_files: paths.len(),
            })
            .await;

        let mut summary = IngestSummary::default();
        for path in paths {
            let _ = event_tx
                .send(IngestEvent::FileStarted { path: path.clone() })
                .await;

            let file_options = IngestOptions {
                title: options.title.clone().or_else(|| file_stem(path)),
                language: options.language,
            };

            match self.ingest_file(path, &file_options).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    if !outcome.degradations.is_empty() {
                        summary.degraded += 1;
                    }
                    let _ = event_tx
                        .send(IngestEvent::FileStored {
                            path: path.clone(),
                            document_id: outcome.document.id,
                            title: outcome.document.title,
                            degradations: outcome.degradations,
                        })
                        .await;
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {}", path.display(), e);
                    summary.failed += 1;
                    let _ = event_tx
                        .send(IngestEvent::FileFailed {
                            path: path.clone(),
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }

        let _ = event_tx
            .send(IngestEvent::Complete {
                succeeded: summary.succeeded,
                failed: summary.failed,
            })
            .await;

        summary
    }
}

/// File name without extension, used as the default title.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Supported files directly inside `dir`, sorted by name. Not recursive.
pub fn list_supported_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && extract::is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::repository::SqliteDocumentStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Unavailable;

    #[async_trait]
    impl TextGenerator for Unavailable {
        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            Err(LlmError::Disabled)
        }
    }

    fn service(dir: &TempDir) -> DocumentService {
        let store = SqliteDocumentStore::open(&dir.path().join("dochub.db")).unwrap();
        DocumentService::new(
            Arc::new(Unavailable),
            Some(Arc::new(store)),
            AnnotationLimits::default(),
        )
    }

    #[test]
    fn test_extraction_errors_map_to_pipeline_errors() {
        let err: PipelineError = ExtractionError::UnsupportedFormat(".bmp".into()).into();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ref e) if e == ".bmp"));
        let err: PipelineError = ExtractionError::ExtractionFailed("bad".into()).into();
        assert!(matches!(err, PipelineError::ExtractionFailure(_)));
    }

    #[tokio::test]
    async fn test_ai_unavailable_still_stores() {
        let dir = TempDir::new().unwrap();
        let outcome = service(&dir)
            .ingest_text("Plain ASCII text with no diacritics at all.", &IngestOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.document.summary, "");
        assert!(outcome.document.tags.is_empty());
        assert_eq!(outcome.document.language, Language::English);
        assert_eq!(outcome.document.title, "Untitled Document");
        assert_eq!(outcome.degradations.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir)
            .ingest_text(" \n\t ", &IngestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyContent));
    }

    #[tokio::test]
    async fn test_unsupported_file_never_read() {
        let dir = TempDir::new().unwrap();
        // The file does not exist: an IO error would mean it was opened
        let err = service(&dir)
            .ingest_file(&dir.path().join("scan.bmp"), &IngestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ref e) if e == ".bmp"));
    }

    #[tokio::test]
    async fn test_no_store_configured() {
        let service = DocumentService::new(Arc::new(Unavailable), None, AnnotationLimits::default());
        let err = service
            .ingest_text("content", &IngestOptions::titled("T"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::PersistenceUnavailable));
    }

    #[tokio::test]
    async fn test_ingest_bytes_records_no_source_file() {
        let dir = TempDir::new().unwrap();
        let outcome = service(&dir)
            .ingest_bytes(b"  markdown body  ", DocumentFormat::Markdown, &IngestOptions::titled("Notes"))
            .await
            .unwrap();
        assert_eq!(outcome.document.content, "markdown body");
        assert_eq!(outcome.document.title, "Notes");
        assert!(outcome.document.source_file.is_none());
    }

    #[tokio::test]
    async fn test_ingest_paths_reports_events() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("report.txt");
        std::fs::write(&good, "Quarterly report").unwrap();
        let empty = dir.path().join("empty.md");
        std::fs::write(&empty, "   ").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let summary = service(&dir)
            .ingest_paths(&[good.clone(), empty.clone()], &IngestOptions::default(), tx)
            .await;

        assert_eq!(
            summary,
            IngestSummary {
                succeeded: 1,
                failed: 1,
                degraded: 1
            }
        );

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(events[0], IngestEvent::Started { total_files: 2 }));
        assert!(events.iter().any(
            |e| matches!(e, IngestEvent::FileStored { title, path, .. } if title == "report" && *path == good)
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, IngestEvent::FileFailed { path, .. } if *path == empty)));
        assert!(matches!(
            events.last(),
            Some(IngestEvent::Complete {
                succeeded: 1,
                failed: 1
            })
        ));
    }

    #[test]
    fn test_file_stem_title() {
        assert_eq!(
            file_stem(Path::new("/in/Quarterly Report.final.pdf")).as_deref(),
            Some("Quarterly Report.final")
        );
        assert_eq!(file_stem(Path::new("/")), None);
    }

    #[test]
    fn test_list_supported_files() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.txt", "image.bmp", "c.DOCX"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = list_supported_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.pdf", "c.DOCX"]);
    }
}
