//! Document models for annotated document storage.
//!
//! A document moves through three shapes: the text pulled out of an upload
//! (`ExtractedText`), the record assembled for insertion (`NewDocument`), and
//! the stored row read back by identifier (`Document`).

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a document arrives without one.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Input formats accepted by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
    /// Legacy `.doc` files.
    LegacyWord,
    /// Office Open XML `.docx` files.
    ModernWord,
}

impl DocumentFormat {
    /// Every supported format, in extension-listing order.
    pub const ALL: [DocumentFormat; 5] = [
        Self::PlainText,
        Self::Markdown,
        Self::Pdf,
        Self::LegacyWord,
        Self::ModernWord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Markdown => "markdown",
            Self::Pdf => "pdf",
            Self::LegacyWord => "legacy_word",
            Self::ModernWord => "modern_word",
        }
    }

    /// File extension (without the dot) for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Markdown => "md",
            Self::Pdf => "pdf",
            Self::LegacyWord => "doc",
            Self::ModernWord => "docx",
        }
    }

    /// Resolve a format from a file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "md" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::LegacyWord),
            "docx" => Some(Self::ModernWord),
            _ => None,
        }
    }

    /// Resolve a format from the extension of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural language of a document, as far as the classifier can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "vi")]
    Vietnamese,
}

impl Language {
    /// Two-letter tag stored alongside the document.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Vietnamese => "vi",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::English),
            "vi" => Some(Self::Vietnamese),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Plain text pulled out of an input, tagged with the format it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    format: Option<DocumentFormat>,
}

impl ExtractedText {
    /// Text produced by one of the format extractors.
    pub fn new(text: String, format: DocumentFormat) -> Self {
        Self {
            text,
            format: Some(format),
        }
    }

    /// Text supplied directly by a caller rather than extracted from a file.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        self.format
    }

    /// True when the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// AI-derived summary, tags and language for a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub summary: String,
    /// Tags in the order the model returned them.
    pub tags: Vec<String>,
    pub language: Language,
}

impl Annotation {
    /// Annotation carrying no AI output, only the classified language.
    pub fn degraded(language: Language) -> Self {
        Self {
            summary: String::new(),
            tags: Vec::new(),
            language,
        }
    }
}

/// A document record ready to be handed to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Path of the uploaded file, when the content came from one.
    pub source_file: Option<PathBuf>,
}

impl NewDocument {
    /// Build a record from its parts, stamping both timestamps with the same instant.
    pub fn new(
        title: Option<&str>,
        content: &ExtractedText,
        annotation: &Annotation,
        source_file: Option<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_DOCUMENT);

        Self {
            title: title.to_string(),
            content: content.as_str().to_string(),
            summary: annotation.summary.clone(),
            tags: annotation.tags.clone(),
            language: annotation.language,
            created_at: now,
            updated_at: now,
            source_file,
        }
    }

    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: String) -> Document {
        Document {
            id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            tags: self.tags,
            language: self.language,
            created_at: self.created_at,
            updated_at: self.updated_at,
            source_file: self.source_file,
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_file: Option<PathBuf>,
}

impl Document {
    /// First `max_chars` characters of the content, with an ellipsis when cut.
    pub fn content_preview(&self, max_chars: usize) -> String {
        if self.content.chars().count() > max_chars {
            let head: String = self.content.chars().take(max_chars).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }
}
