//! Card extraction from images.
//!
//! The service call itself sits behind [`TextExtractor`]; everything around
//! it (input checks, prompt, response parsing) lives here so it can be tested
//! without a network.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::core::card::CardDraft;
use crate::error::{LexiError, Result};
use crate::transfer::document::record_to_draft;

/// Instruction sent with every image.
pub const EXTRACTION_PROMPT: &str = r#"Please extract all the words from the image (English/Arabic) and convert them into a JSON array with the following structure:

[
  {
    "word": "English word",
    "meaning": "Arabic translation",
    "example": "A realistic English sentence using the word"
  }
]

Notes:
- Each word must have a realistic example sentence that matches its meaning.
- Only return the JSON array, no additional text or explanations.
- If you cannot extract words clearly, return an empty array []."#;

/// An image ready to be sent for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// Read an image file, refusing non-images and files over `max_bytes`.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let mime_type = mime_type_for(path)
            .ok_or_else(|| LexiError::validation("please select a valid image file"))?;

        let size = fs::metadata(path)
            .map_err(|e| LexiError::storage(path, e))?
            .len();
        if size > max_bytes {
            return Err(LexiError::validation(format!(
                "image is {} bytes, the limit is {} bytes",
                size, max_bytes
            )));
        }

        let bytes = fs::read(path).map_err(|e| LexiError::storage(path, e))?;
        Ok(Self { mime_type, bytes })
    }
}

/// Image MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// A service that reads an image and answers with text.
pub trait TextExtractor {
    /// Send `image` with `prompt`; return the service's text answer.
    fn extract_text(&self, prompt: &str, image: &ImageInput) -> Result<String>;
}

/// Run the extractor and turn its answer into drafts.
pub fn extract_cards<E: TextExtractor + ?Sized>(
    extractor: &E,
    image: &ImageInput,
) -> Result<Vec<CardDraft>> {
    let text = extractor.extract_text(EXTRACTION_PROMPT, image)?;
    parse_extraction_response(&text)
}

/// Parse the service's answer.
///
/// The answer may wrap the array in prose or code fences; the span from the
/// first `[` to the last `]` is parsed. Entries missing a field are dropped.
/// No usable entry at all is an error.
pub fn parse_extraction_response(text: &str) -> Result<Vec<CardDraft>> {
    let span = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(LexiError::external_service(
                "extraction response contains no word list",
            ))
        }
    };

    let value: Value = serde_json::from_str(span).map_err(|e| {
        LexiError::external_service(format!("extraction response is not valid JSON: {}", e))
    })?;
    let Value::Array(items) = value else {
        return Err(LexiError::external_service(
            "extraction response contains no word list",
        ));
    };

    let total = items.len();
    let drafts: Vec<CardDraft> = items.iter().filter_map(record_to_draft).collect();
    if drafts.len() < total {
        tracing::debug!(dropped = total - drafts.len(), "incomplete extracted entries dropped");
    }

    if drafts.is_empty() {
        return Err(LexiError::external_service(
            "no words could be extracted from the image, try a clearer image",
        ));
    }
    Ok(drafts)
}

/// Pull the answer text out of a `generateContent` response body.
pub fn generate_content_text(body: &Value) -> Result<String> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LexiError::external_service("invalid response from extraction service"))
}
