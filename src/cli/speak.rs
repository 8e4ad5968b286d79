//! Speak command for Lexicard.

use serde::{Deserialize, Serialize};

use crate::speech::{Accent, Speaker};
use crate::storage::StateStore;
use crate::trainer::Trainer;

/// Options for the speak command.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Accent override.
    pub accent: Option<Accent>,
}

/// Output format for the speak command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakOutput {
    pub success: bool,
    /// Text that was spoken.
    pub text: String,
    pub accent: Accent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The speak command implementation.
pub struct SpeakCommand<S: StateStore> {
    trainer: Trainer<S>,
    speaker: Box<dyn Speaker>,
}

impl<S: StateStore> SpeakCommand<S> {
    /// Create a new speak command.
    pub fn new(trainer: Trainer<S>, speaker: Box<dyn Speaker>) -> Self {
        Self { trainer, speaker }
    }

    /// Speak `text`, or the current card's word when no text is given.
    pub fn run(&self, text: Option<&str>, options: &SpeakOptions) -> SpeakOutput {
        let accent = options
            .accent
            .unwrap_or(self.trainer.config().speech.default_accent);

        let (spoken, result) = match text {
            Some(text) => (text.to_string(), self.speaker.speak(text, accent)),
            None => (
                self.trainer
                    .deck()
                    .current()
                    .map(|c| c.word.clone())
                    .unwrap_or_default(),
                self.trainer.speak_word(self.speaker.as_ref(), Some(accent)),
            ),
        };

        SpeakOutput {
            success: result.is_ok(),
            text: spoken,
            accent,
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SpeakOutput, options: &SpeakOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            format!("Speaking \"{}\" ({})", output.text, output.accent)
        } else {
            format!(
                "Speech failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
