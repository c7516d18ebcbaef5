//! PDF text extraction.

use lopdf::Document as PdfDocument;
use tracing::debug;

use super::{ExtractionError, Extractor};

/// Extracts text from each page of a PDF in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let pdf = PdfDocument::load_mem(bytes)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("Failed to parse PDF: {}", e)))?;

        // get_pages is keyed by 1-based page number, so iteration is document order
        let pages = pdf.get_pages();
        debug!("PDF has {} pages", pages.len());

        let page_texts = pages.keys().map(|&page_num| match pdf.extract_text(&[page_num]) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("No text extracted from page {}: {}", page_num, e);
                None
            }
        });

        Ok(join_pages(page_texts))
    }
}

/// Join per-page text with newlines, skipping pages that produced nothing.
fn join_pages(pages: impl IntoIterator<Item = Option<String>>) -> String {
    pages
        .into_iter()
        .flatten()
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
