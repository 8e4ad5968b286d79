//! Speech output.
//!
//! Speaking is best-effort and fire-and-forget: a failure is reported to the
//! caller but never affects scoring or session state.

use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;
use crate::error::{LexiError, Result};

/// Accent preference for spoken English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    American,
    British,
}

impl Accent {
    /// Voice code understood by espeak-style synthesizers.
    pub fn voice_code(&self) -> &'static str {
        match self {
            Accent::American => "en-us",
            Accent::British => "en-gb",
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accent::American => write!(f, "american"),
            Accent::British => write!(f, "british"),
        }
    }
}

impl FromStr for Accent {
    type Err = LexiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "american" | "us" | "en-us" => Ok(Accent::American),
            "british" | "uk" | "gb" | "en-gb" => Ok(Accent::British),
            other => Err(LexiError::validation(format!("unknown accent '{}'", other))),
        }
    }
}

/// Whether `text` contains Arabic-script characters.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}')
    })
}

/// Reject text that should not be sent to an English voice.
pub fn check_speakable(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LexiError::external_service("no text to speak"));
    }
    if contains_arabic(text) {
        return Err(LexiError::external_service(
            "Arabic text cannot be pronounced, only English words are spoken",
        ));
    }
    Ok(text)
}

/// A text-to-speech backend.
pub trait Speaker {
    /// Start speaking `text`. Returns once speech has been handed off.
    fn speak(&self, text: &str, accent: Accent) -> Result<()>;
}

/// Speaks by running an external program such as `espeak-ng` or `say`.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments for one invocation: the template with `{voice}` filled in,
    /// followed by the text.
    pub fn build_args(&self, text: &str, accent: Accent) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{voice}", accent.voice_code()))
            .chain(std::iter::once(text.to_string()))
            .collect()
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str, accent: Accent) -> Result<()> {
        let text = check_speakable(text)?;
        let mut child = Command::new(&self.program)
            .args(self.build_args(text, accent))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                LexiError::external_service(format!("failed to run '{}': {}", self.program, e))
            })?;

        // Reap in the background so the caller never waits on audio.
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!(error = %e, "speech process wait failed");
            }
        });
        tracing::debug!(program = %self.program, %accent, "speech started");
        Ok(())
    }
}

/// Speaker that only validates its input. Used when no command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, text: &str, accent: Accent) -> Result<()> {
        let text = check_speakable(text)?;
        tracing::debug!(text, %accent, "speech disabled, nothing spoken");
        Ok(())
    }
}

/// Build the speaker described by the configuration.
pub fn from_config(config: &SpeechConfig) -> Box<dyn Speaker> {
    match &config.command {
        Some(program) => Box::new(CommandSpeaker::new(program.clone(), config.args.clone())),
        None => Box::new(SilentSpeaker),
    }
}
