//! Moving cards in and out of the trainer.
//!
//! Export and import of card documents, and card extraction from images
//! through an external text-extraction service.

pub mod document;
pub mod extract;
#[cfg(feature = "image-import")]
pub mod gemini;

pub use document::{export_document, export_file_name, parse_import_document};
pub use extract::{
    extract_cards, parse_extraction_response, ImageInput, TextExtractor, EXTRACTION_PROMPT,
};
#[cfg(feature = "image-import")]
pub use gemini::GeminiExtractor;
