//! Init command for Lexicard.
//!
//! Creates the Lexicard home directory and a commented `config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Overwrite an existing config file.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Files and directories created.
    pub created: Vec<String>,
    /// Files that already existed (skipped).
    pub skipped: Vec<String>,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Create a failed output, keeping what was created before the failure.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
        }
    }
}

/// Default config.toml content.
const DEFAULT_CONFIG: &str = r#"# Lexicard Configuration
#
# Environment variables override these values:
#   LEXICARD_FEEDBACK_DELAY_MS, LEXICARD_FILL_BLANK_UNMATCHED,
#   LEXICARD_SPEECH_COMMAND, LEXICARD_ACCENT

[practice]
# Milliseconds feedback stays on screen before the next question
feedback_delay_ms = 2000
blank_marker = "_____"
# Distractors used when the deck has fewer than four distinct words
filler_words = ["hello", "world", "learn", "study", "practice", "word", "language"]
# Cards whose word is missing from their example: "skip" or "unblanked"
fill_blank_unmatched = "skip"
# Never show a scramble identical to the answer
avoid_identity_scramble = true

# Text-to-speech. Without a command nothing is spoken.
# Example: command = "espeak-ng", args = ["-v", "{voice}"]
[speech]
args = []
default_accent = "american"

# Image import (requires the image-import feature)
[extraction]
endpoint = "https://generativelanguage.googleapis.com/v1/models"
model = "gemini-1.5-flash"
api_key_env = "GEMINI_API_KEY"
max_image_bytes = 10485760
"#;

/// The init command implementation.
pub struct InitCommand {
    home: PathBuf,
}

impl InitCommand {
    /// Create a new init command for the given Lexicard home.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        match self.ensure_dir(&self.home) {
            Ok(true) => created.push(self.home.display().to_string()),
            Ok(false) => skipped.push(self.home.display().to_string()),
            Err(e) => return InitOutput::failure(e, created, skipped),
        }

        let config_path = self.home.join("config.toml");
        match self.ensure_file(&config_path, DEFAULT_CONFIG, options.force) {
            Ok(true) => created.push(config_path.display().to_string()),
            Ok(false) => skipped.push(config_path.display().to_string()),
            Err(e) => return InitOutput::failure(e, created, skipped),
        }

        InitOutput::success(created, skipped)
    }

    /// Returns Ok(true) if created, Ok(false) if it already exists.
    fn ensure_dir(&self, path: &Path) -> Result<bool, String> {
        if path.exists() {
            if path.is_dir() {
                return Ok(false);
            }
            return Err(format!("{} exists but is not a directory", path.display()));
        }

        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;
        Ok(true)
    }

    /// Returns Ok(true) if written, Ok(false) if it already exists.
    fn ensure_file(&self, path: &Path, content: &str, force: bool) -> Result<bool, String> {
        if path.exists() && !force {
            return Ok(false);
        }

        fs::write(path, content)
            .map_err(|e| format!("Failed to write file {}: {}", path.display(), e))?;
        Ok(true)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &InitOutput) -> String {
        let mut lines = Vec::new();

        if !output.success {
            lines.push(format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            ));
            if !output.created.is_empty() {
                lines.push("Partially created before failure:".to_string());
                for path in &output.created {
                    lines.push(format!("  {}", path));
                }
            }
            return lines.join("\n");
        }

        if !output.created.is_empty() {
            lines.push("Created:".to_string());
            for path in &output.created {
                lines.push(format!("  {}", path));
            }
        }
        if !output.skipped.is_empty() {
            lines.push("Already exists (skipped):".to_string());
            for path in &output.skipped {
                lines.push(format!("  {}", path));
            }
        }
        lines.push(String::new());
        lines.push("Lexicard initialized.".to_string());

        lines.join("\n")
    }
}
