//! Reset command for Lexicard.
//!
//! Zeroes score counters, or wipes all stored data.

use serde::{Deserialize, Serialize};

use crate::core::PracticeMode;
use crate::storage::StateStore;
use crate::trainer::Trainer;

/// What to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    /// One practice mode's counter.
    Mode(PracticeMode),
    /// The legacy quiz counter.
    Quiz,
    /// Every score counter.
    Scores,
    /// Cards, scores, statistics and progress.
    Everything,
}

impl ResetTarget {
    fn describe(&self) -> String {
        match self {
            ResetTarget::Mode(mode) => format!("{} score", mode.display_name()),
            ResetTarget::Quiz => "quiz score".to_string(),
            ResetTarget::Scores => "all scores".to_string(),
            ResetTarget::Everything => "all data".to_string(),
        }
    }
}

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Required to wipe everything.
    pub force: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOutput {
    /// Whether the reset was performed.
    pub success: bool,
    /// What was reset.
    pub reset: String,
    /// Error message if the reset failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResetOutput {
    /// Create a successful output.
    pub fn success(reset: impl Into<String>) -> Self {
        Self {
            success: true,
            reset: reset.into(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(reset: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            reset: reset.into(),
            error: Some(error.into()),
        }
    }
}

/// The reset command implementation.
pub struct ResetCommand<S: StateStore> {
    trainer: Trainer<S>,
}

impl<S: StateStore> ResetCommand<S> {
    /// Create a new reset command.
    pub fn new(trainer: Trainer<S>) -> Self {
        Self { trainer }
    }

    pub fn trainer(&self) -> &Trainer<S> {
        &self.trainer
    }

    /// Run the reset command.
    pub fn run(&mut self, target: ResetTarget, options: &ResetOptions) -> ResetOutput {
        let description = target.describe();
        match target {
            ResetTarget::Mode(mode) => self.trainer.reset_score(mode),
            ResetTarget::Quiz => self.trainer.reset_quiz_score(),
            ResetTarget::Scores => self.trainer.reset_all_scores(),
            ResetTarget::Everything => {
                if !options.force {
                    return ResetOutput::failure(
                        description,
                        "this deletes every card and score; pass --force to confirm",
                    );
                }
                if let Err(e) = self.trainer.clear_all() {
                    return ResetOutput::failure(description, e.to_string());
                }
            }
        }
        ResetOutput::success(description)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            format!("Reset {}", output.reset)
        } else {
            format!(
                "Failed to reset {}: {}",
                output.reset,
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
