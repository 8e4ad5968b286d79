//! Export and import commands for Lexicard.
//!
//! Export writes `flashcards_YYYY-MM-DD.json`; import appends the cards of
//! such a document, or the cards extracted from a photo of a word list.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::error::{LexiError, Result};
use crate::storage::StateStore;
use crate::trainer::Trainer;
use crate::transfer::{extract_cards, ImageInput, TextExtractor};

/// Options for the transfer commands.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the transfer commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutput {
    /// Whether the transfer succeeded.
    pub success: bool,
    /// `export` or `import`.
    pub action: String,
    /// File written or read.
    pub path: String,
    /// Cards exported or imported.
    pub count: usize,
    /// Ids assigned to imported cards.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    /// Error message if the transfer failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferOutput {
    /// Create a successful output.
    pub fn success(action: &str, path: &Path, count: usize, ids: Vec<String>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            path: path.display().to_string(),
            count,
            ids,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(action: &str, path: &Path, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            path: path.display().to_string(),
            count: 0,
            ids: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The transfer command implementation.
pub struct TransferCommand<S: StateStore> {
    trainer: Trainer<S>,
}

impl<S: StateStore> TransferCommand<S> {
    /// Create a new transfer command.
    pub fn new(trainer: Trainer<S>) -> Self {
        Self { trainer }
    }

    pub fn trainer(&self) -> &Trainer<S> {
        &self.trainer
    }

    /// Export every card. `target` may be a directory, in which case the
    /// dated file name is used inside it.
    pub fn export(&self, target: &Path) -> TransferOutput {
        let (file_name, text) = match self.trainer.export_document() {
            Ok(doc) => doc,
            Err(e) => return TransferOutput::failure("export", target, e.to_string()),
        };

        let path = if target.is_dir() {
            target.join(file_name)
        } else {
            target.to_path_buf()
        };

        match fs::write(&path, text) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "cards exported");
                TransferOutput::success("export", &path, self.trainer.deck().len(), Vec::new())
            }
            Err(e) => TransferOutput::failure(
                "export",
                &path,
                LexiError::storage(&path, e).to_string(),
            ),
        }
    }

    /// Import the cards of an exported document.
    pub fn import(&mut self, path: &Path) -> TransferOutput {
        let result = fs::read_to_string(path)
            .map_err(|e| LexiError::storage(path, e))
            .and_then(|text| self.trainer.import_document(&text));
        self.import_result(path, result.map(|ids| ids.iter().map(|id| id.to_string()).collect()))
    }

    /// Import the cards found in an image.
    pub fn import_image(
        &mut self,
        path: &Path,
        extractor: &dyn TextExtractor,
        config: &ExtractionConfig,
    ) -> TransferOutput {
        let result = ImageInput::from_path(path, config.max_image_bytes)
            .and_then(|image| extract_cards(extractor, &image))
            .and_then(|drafts| self.trainer.import_drafts(drafts));
        self.import_result(path, result.map(|ids| ids.iter().map(|id| id.to_string()).collect()))
    }

    fn import_result(&self, path: &Path, result: Result<Vec<String>>) -> TransferOutput {
        match result {
            Ok(ids) => TransferOutput::success("import", path, ids.len(), ids),
            Err(e) => TransferOutput::failure("import", path, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TransferOutput, options: &TransferOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if !output.success {
            format!(
                "Failed to {} {}: {}",
                output.action,
                output.path,
                output.error.as_deref().unwrap_or("unknown error")
            )
        } else if output.action == "export" {
            format!("Exported {} card(s) to {}", output.count, output.path)
        } else {
            format!("Imported {} card(s) from {}", output.count, output.path)
        }
    }
}

/// The extractor used for image import.
#[cfg(feature = "image-import")]
pub fn image_extractor(config: &ExtractionConfig) -> Result<Box<dyn TextExtractor>> {
    Ok(Box::new(crate::transfer::GeminiExtractor::from_config(
        config,
    )?))
}

/// The extractor used for image import.
#[cfg(not(feature = "image-import"))]
pub fn image_extractor(_config: &ExtractionConfig) -> Result<Box<dyn TextExtractor>> {
    Err(LexiError::config(
        "image import is not available in this build (enable the image-import feature)",
    ))
}

/// Default export target: the current directory.
pub fn default_export_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
