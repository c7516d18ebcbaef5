//! Text extraction from uploaded documents.
//!
//! Each supported format has its own extractor behind the [`Extractor`]
//! trait:
//! - plain text and markdown: UTF-8 with a Latin-1 fallback
//! - PDF: per-page text via lopdf
//! - Word: `word/document.xml` text runs from the OOXML archive
//!
//! [`ContentExtractor`] picks the extractor for a declared format and trims
//! the result.

mod pdf;
mod text;
mod word;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::models::{DocumentFormat, ExtractedText};

pub use pdf::PdfExtractor;
pub use text::TextExtractor;
pub use word::WordExtractor;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts the payload of one document format into plain text.
pub trait Extractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// The closed set of extractors, keyed by format.
#[derive(Debug, Clone, Copy)]
pub enum ExtractorKind {
    Text(TextExtractor),
    Pdf(PdfExtractor),
    Word(WordExtractor),
}

impl ExtractorKind {
    pub fn for_format(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::PlainText | DocumentFormat::Markdown => Self::Text(TextExtractor),
            DocumentFormat::Pdf => Self::Pdf(PdfExtractor),
            DocumentFormat::LegacyWord | DocumentFormat::ModernWord => Self::Word(WordExtractor),
        }
    }
}

impl Extractor for ExtractorKind {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match self {
            Self::Text(e) => e.extract(bytes),
            Self::Pdf(e) => e.extract(bytes),
            Self::Word(e) => e.extract(bytes),
        }
    }
}

/// Extension list accepted by [`ContentExtractor::extract_file`].
pub fn supported_extensions() -> Vec<&'static str> {
    DocumentFormat::ALL.iter().map(|f| f.extension()).collect()
}

/// Check whether a path has a supported extension.
pub fn is_supported(path: &Path) -> bool {
    DocumentFormat::from_path(path).is_some()
}

/// Resolve the format of a path, failing for anything outside the supported set.
pub fn format_for_path(path: &Path) -> Result<DocumentFormat, ExtractionError> {
    DocumentFormat::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_else(|| path.display().to_string());
        ExtractionError::UnsupportedFormat(ext)
    })
}

/// Format-dispatching extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from an in-memory payload of a declared format.
    pub fn extract(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ExtractedText, ExtractionError> {
        debug!("Extracting {} bytes as {}", bytes.len(), format);
        let text = ExtractorKind::for_format(format).extract(bytes)?;
        Ok(ExtractedText::new(text.trim().to_string(), format))
    }

    /// Extract text from a file, resolving its format from the extension.
    ///
    /// Unsupported extensions are rejected before the file is opened.
    pub async fn extract_file(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let format = format_for_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        self.extract(&bytes, format)
    }
}
