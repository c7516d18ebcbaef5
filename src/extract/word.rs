//! Word document extraction.
//!
//! A `.docx` file is a ZIP archive; the body lives in `word/document.xml`
//! and its visible text sits in `t` run elements of the WordprocessingML
//! namespace (conventionally written `<w:t>`). Legacy binary `.doc`
//! files (OLE2 compound documents) are recognised by signature and rejected.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use zip::ZipArchive;

use super::{ExtractionError, Extractor};

/// Archive member holding the main document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// WordprocessingML main namespace.
const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Signature of OLE2 compound files (legacy `.doc`, `.xls`, ...).
const OLE2_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extracts the text runs of an Office Open XML word document.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordExtractor;

impl Extractor for WordExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if bytes.starts_with(&OLE2_SIGNATURE) {
            return Err(ExtractionError::ExtractionFailed(
                "legacy binary Word (.doc) documents are not supported; save as .docx".to_string(),
            ));
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("Failed to open Word archive: {}", e))
        })?;

        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("Missing {}: {}", DOCUMENT_PART, e))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("Failed to read {}: {}", DOCUMENT_PART, e))
        })?;

        extract_text_runs(&xml)
    }
}

fn is_text_run(ns: &ResolveResult, local_name: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == WORDML_NS) && local_name == b"t"
}

/// Concatenate the content of every WordprocessingML `t` element in document
/// order, whatever prefix the document binds the namespace to.
fn extract_text_runs(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = NsReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) if is_text_run(&ns, e.local_name().as_ref()) => {
                in_text_run = true
            }
            Ok((ns, Event::End(e))) if is_text_run(&ns, e.local_name().as_ref()) => {
                in_text_run = false
            }
            Ok((_, Event::Text(e))) if in_text_run => {
                let text = e.unescape().map_err(|err| {
                    ExtractionError::ExtractionFailed(format!("Malformed document XML: {}", err))
                })?;
                output.push_str(&text);
            }
            Ok((_, Event::CData(e))) if in_text_run => {
                output.push_str(&String::from_utf8_lossy(&e));
            }
            Ok((_, Event::Eof)) => break,
            Err(err) => {
                return Err(ExtractionError::ExtractionFailed(format!(
                    "Malformed document XML: {}",
                    err
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}
