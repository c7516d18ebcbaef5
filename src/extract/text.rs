//! Plain text and markdown extraction.

use tracing::debug;

use super::{ExtractionError, Extractor};

/// Decodes text files as UTF-8, falling back to Latin-1.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => {
                debug!("Not valid UTF-8 ({}), decoding as Latin-1", e);
                Ok(decode_latin1(bytes))
            }
        }
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
