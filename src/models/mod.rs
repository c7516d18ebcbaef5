//! Data models for dochub.

mod document;

pub use document::{
    Annotation, Document, DocumentFormat, ExtractedText, Language, NewDocument, UNTITLED_DOCUMENT,
};
