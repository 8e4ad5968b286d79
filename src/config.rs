//! Configuration loading for Lexicard.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Explicit config file (`--config <path>`)
//! 3. User config (`~/.lexicard/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The trainer runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LexiError, Result};
use crate::speech::Accent;

/// Longest accepted pause after answer feedback, in milliseconds.
pub const MAX_FEEDBACK_DELAY_MS: u64 = 60_000;

/// Main configuration struct for Lexicard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Practice session behavior.
    pub practice: PracticeConfig,
    /// Speech output.
    pub speech: SpeechConfig,
    /// Image-based import.
    pub extraction: ExtractionConfig,
}

/// What fill-in-blank does with a card whose word is absent from its example.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillBlankPolicy {
    /// The card is never a fill-in-blank target.
    #[default]
    Skip,
    /// The sentence is shown without a blank.
    Unblanked,
}

impl FillBlankPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(FillBlankPolicy::Skip),
            "unblanked" => Some(FillBlankPolicy::Unblanked),
            _ => None,
        }
    }
}

/// Valid values for the fill-blank policy field.
pub const VALID_FILL_BLANK_POLICIES: &[&str] = &["skip", "unblanked"];

/// Practice session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    /// Delay before the next question after feedback, in milliseconds.
    pub feedback_delay_ms: u64,
    /// Replaces the word in fill-in-blank sentences.
    pub blank_marker: String,
    /// Pads multiple-choice options when the deck is small.
    pub filler_words: Vec<String>,
    pub fill_blank_unmatched: FillBlankPolicy,
    /// Never show a scramble identical to the word when avoidable.
    pub avoid_identity_scramble: bool,
}

impl PracticeConfig {
    /// Feedback pause, capped at [`MAX_FEEDBACK_DELAY_MS`].
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms.min(MAX_FEEDBACK_DELAY_MS))
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 2000,
            blank_marker: "_____".to_string(),
            filler_words: ["hello", "world", "learn", "study", "practice", "word", "language"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            fill_blank_unmatched: FillBlankPolicy::Skip,
            avoid_identity_scramble: true,
        }
    }
}

/// Speech output configuration.
///
/// With no `command`, nothing is spoken.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// Program to run, e.g. `espeak-ng`.
    pub command: Option<String>,
    /// Argument template; `{voice}` is replaced by the accent's voice code.
    /// The text is passed as the last argument.
    pub args: Vec<String>,
    pub default_accent: Accent,
}

/// Image extraction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of the models endpoint.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Largest accepted image, in bytes.
    pub max_image_bytes: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1/models".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. `explicit` config file, if given
    /// 3. User config (`<lexicard home>/config.toml`)
    /// 4. Defaults
    ///
    /// An explicit file that cannot be read or parsed is an error; a broken
    /// user config is skipped with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(path) = explicit {
            config = config.merge(Self::load_from_file(path)?);
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load user config from `<lexicard home>/config.toml`.
    fn load_user_config() -> Option<Config> {
        let path = user_config_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring user config");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| LexiError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| LexiError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // LEXICARD_FEEDBACK_DELAY_MS
        if let Ok(val) = env::var("LEXICARD_FEEDBACK_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(n) if n <= MAX_FEEDBACK_DELAY_MS => self.practice.feedback_delay_ms = n,
                _ => eprintln!(
                    "Warning: Invalid LEXICARD_FEEDBACK_DELAY_MS value '{}'. \
                    Expected an integer from 0 to {}. Using '{}'.",
                    val, MAX_FEEDBACK_DELAY_MS, self.practice.feedback_delay_ms
                ),
            }
        }

        // LEXICARD_FILL_BLANK_UNMATCHED
        if let Ok(val) = env::var("LEXICARD_FILL_BLANK_UNMATCHED") {
            match FillBlankPolicy::parse(&val) {
                Some(policy) => self.practice.fill_blank_unmatched = policy,
                None => eprintln!(
                    "Warning: Invalid LEXICARD_FILL_BLANK_UNMATCHED value '{}'. \
                    Valid values: {:?}. Using '{:?}'.",
                    val, VALID_FILL_BLANK_POLICIES, self.practice.fill_blank_unmatched
                ),
            }
        }

        // LEXICARD_SPEECH_COMMAND
        if let Ok(val) = env::var("LEXICARD_SPEECH_COMMAND") {
            let val = val.trim();
            self.speech.command = if val.is_empty() {
                None
            } else {
                Some(val.to_string())
            };
        }

        // LEXICARD_ACCENT
        if let Ok(val) = env::var("LEXICARD_ACCENT") {
            match val.parse::<Accent>() {
                Ok(accent) => self.speech.default_accent = accent,
                Err(_) => eprintln!(
                    "Warning: Invalid LEXICARD_ACCENT value '{}'. \
                    Valid values: [\"american\", \"british\"]. Using '{}'.",
                    val, self.speech.default_accent
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field by field: every value in `other` that differs from the default
    /// replaces the value in `self`. A layer therefore cannot reset a value
    /// back to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_practice = PracticeConfig::default();
        if other.practice.feedback_delay_ms != default_practice.feedback_delay_ms {
            self.practice.feedback_delay_ms = other.practice.feedback_delay_ms;
        }
        if other.practice.blank_marker != default_practice.blank_marker {
            self.practice.blank_marker = other.practice.blank_marker;
        }
        if other.practice.filler_words != default_practice.filler_words {
            self.practice.filler_words = other.practice.filler_words;
        }
        if other.practice.fill_blank_unmatched != default_practice.fill_blank_unmatched {
            self.practice.fill_blank_unmatched = other.practice.fill_blank_unmatched;
        }
        if other.practice.avoid_identity_scramble != default_practice.avoid_identity_scramble {
            self.practice.avoid_identity_scramble = other.practice.avoid_identity_scramble;
        }

        if other.speech.command.is_some() {
            self.speech.command = other.speech.command;
        }
        if !other.speech.args.is_empty() {
            self.speech.args = other.speech.args;
        }
        if other.speech.default_accent != Accent::default() {
            self.speech.default_accent = other.speech.default_accent;
        }

        let default_extraction = ExtractionConfig::default();
        if other.extraction.endpoint != default_extraction.endpoint {
            self.extraction.endpoint = other.extraction.endpoint;
        }
        if other.extraction.model != default_extraction.model {
            self.extraction.model = other.extraction.model;
        }
        if other.extraction.api_key_env != default_extraction.api_key_env {
            self.extraction.api_key_env = other.extraction.api_key_env;
        }
        if other.extraction.max_image_bytes != default_extraction.max_image_bytes {
            self.extraction.max_image_bytes = other.extraction.max_image_bytes;
        }

        self
    }

    /// Render as TOML, for `lexicard config`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LexiError::config(e.to_string()))
    }
}

/// Get the Lexicard home directory.
///
/// Checks `LEXICARD_HOME` first, then falls back to `~/.lexicard`, then to a
/// directory under the system temp dir when no home directory is known.
pub fn lexicard_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("LEXICARD_HOME") {
        if home.is_empty() {
            tracing::warn!("LEXICARD_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("LEXICARD_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".lexicard"));
    }

    let fallback = env::temp_dir().join("lexicard");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback.display()
    );
    Some(fallback)
}

/// Path of the user config file: `<lexicard home>/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    lexicard_home().map(|h| h.join("config.toml"))
}

/// Path of the persisted state record: `<lexicard home>/state.json`.
pub fn state_path() -> Option<PathBuf> {
    lexicard_home().map(|h| h.join("state.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "LEXICARD_FEEDBACK_DELAY_MS",
            "LEXICARD_FILL_BLANK_UNMATCHED",
            "LEXICARD_SPEECH_COMMAND",
            "LEXICARD_ACCENT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.practice.feedback_delay_ms, 2000);
        assert_eq!(config.practice.feedback_delay(), Duration::from_secs(2));
        assert_eq!(config.practice.blank_marker, "_____");
        assert_eq!(config.practice.filler_words.len(), 7);
        assert_eq!(config.practice.fill_blank_unmatched, FillBlankPolicy::Skip);
        assert!(config.practice.avoid_identity_scramble);

        assert!(config.speech.command.is_none());
        assert_eq!(config.speech.default_accent, Accent::American);

        assert_eq!(config.extraction.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.extraction.max_image_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[practice]
feedback_delay_ms = 500
fill_blank_unmatched = "unblanked"

[speech]
command = "espeak-ng"
args = ["-v", "{voice}"]
default_accent = "british"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.practice.feedback_delay_ms, 500);
        assert_eq!(config.practice.fill_blank_unmatched, FillBlankPolicy::Unblanked);
        // Unset fields keep defaults
        assert_eq!(config.practice.blank_marker, "_____");
        assert_eq!(config.speech.command.as_deref(), Some("espeak-ng"));
        assert_eq!(config.speech.default_accent, Accent::British);
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(LexiError::Storage { .. })));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[practice\nfeedback_delay_ms = ").unwrap();
        let result = Config::load_from_file(&path);
        assert!(matches!(result, Err(LexiError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_explicit_file_overrides_user_config() {
        clear_env();
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            "[practice]\nfeedback_delay_ms = 100\nblank_marker = \"___\"\n",
        )
        .unwrap();
        let explicit = home.path().join("explicit.toml");
        fs::write(&explicit, "[practice]\nfeedback_delay_ms = 700\n").unwrap();

        env::set_var("LEXICARD_HOME", home.path());
        let config = Config::load(Some(&explicit)).unwrap();
        env::remove_var("LEXICARD_HOME");

        assert_eq!(config.practice.feedback_delay_ms, 700);
        assert_eq!(config.practice.blank_marker, "___");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let home = TempDir::new().unwrap();
        let explicit = home.path().join("explicit.toml");
        fs::write(&explicit, "[practice]\nfeedback_delay_ms = 700\n").unwrap();

        env::set_var("LEXICARD_HOME", home.path());
        env::set_var("LEXICARD_FEEDBACK_DELAY_MS", "50");
        let config = Config::load(Some(&explicit)).unwrap();
        env::remove_var("LEXICARD_HOME");
        clear_env();

        assert_eq!(config.practice.feedback_delay_ms, 50);
    }

    #[test]
    #[serial]
    fn test_explicit_file_missing_is_error() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("LEXICARD_HOME", home.path());
        let result = Config::load(Some(Path::new("/nonexistent/lexicard.toml")));
        env::remove_var("LEXICARD_HOME");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_broken_user_config_is_skipped() {
        clear_env();
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("config.toml"), "not = [valid").unwrap();
        env::set_var("LEXICARD_HOME", home.path());
        let config = Config::load(None).unwrap();
        env::remove_var("LEXICARD_HOME");
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("LEXICARD_FEEDBACK_DELAY_MS", "0");
        env::set_var("LEXICARD_FILL_BLANK_UNMATCHED", "unblanked");
        env::set_var("LEXICARD_SPEECH_COMMAND", "say");
        env::set_var("LEXICARD_ACCENT", "british");

        let mut config = Config::default();
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config.practice.feedback_delay_ms, 0);
        assert_eq!(config.practice.fill_blank_unmatched, FillBlankPolicy::Unblanked);
        assert_eq!(config.speech.command.as_deref(), Some("say"));
        assert_eq!(config.speech.default_accent, Accent::British);
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        env::set_var("LEXICARD_FEEDBACK_DELAY_MS", "soon");
        env::set_var("LEXICARD_FILL_BLANK_UNMATCHED", "sometimes");
        env::set_var("LEXICARD_ACCENT", "martian");

        let mut config = Config::default();
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_feedback_delay_is_bounded() {
        clear_env();
        env::set_var("LEXICARD_FEEDBACK_DELAY_MS", "18446744073709551615");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.practice.feedback_delay_ms, 2000);

        env::set_var("LEXICARD_FEEDBACK_DELAY_MS", "60000");
        config.apply_env_overrides();
        clear_env();
        assert_eq!(config.practice.feedback_delay_ms, MAX_FEEDBACK_DELAY_MS);

        let config: Config = toml::from_str("[practice]\nfeedback_delay_ms = 9999999999\n").unwrap();
        assert_eq!(
            config.practice.feedback_delay(),
            Duration::from_millis(MAX_FEEDBACK_DELAY_MS)
        );
    }

    #[test]
    #[serial]
    fn test_empty_speech_command_disables_speech() {
        clear_env();
        env::set_var("LEXICARD_SPEECH_COMMAND", "  ");
        let mut config = Config::default();
        config.speech.command = Some("espeak-ng".to_string());
        config.apply_env_overrides();
        clear_env();
        assert!(config.speech.command.is_none());
    }

    #[test]
    fn test_merge_field_by_field() {
        let mut base = Config::default();
        base.practice.feedback_delay_ms = 100;
        base.speech.command = Some("espeak-ng".to_string());

        let mut other = Config::default();
        other.practice.blank_marker = "___".to_string();
        other.extraction.model = "gemini-2.0-flash".to_string();

        let merged = base.merge(other);
        assert_eq!(merged.practice.feedback_delay_ms, 100);
        assert_eq!(merged.practice.blank_marker, "___");
        assert_eq!(merged.speech.command.as_deref(), Some("espeak-ng"));
        assert_eq!(merged.extraction.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_fill_blank_policy_parse() {
        assert_eq!(FillBlankPolicy::parse("skip"), Some(FillBlankPolicy::Skip));
        assert_eq!(FillBlankPolicy::parse(" Unblanked "), Some(FillBlankPolicy::Unblanked));
        assert_eq!(FillBlankPolicy::parse("never"), None);
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let mut config = Config::default();
        config.practice.feedback_delay_ms = 1500;
        config.speech.command = Some("espeak-ng".to_string());
        config.speech.args = vec!["-v".to_string(), "{voice}".to_string()];
        config.speech.default_accent = Accent::British;

        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    #[serial]
    fn test_lexicard_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("LEXICARD_HOME", dir.path().to_str().unwrap());
        let home = lexicard_home().unwrap();
        env::remove_var("LEXICARD_HOME");
        assert_eq!(home, dir.path());
    }

    #[test]
    #[serial]
    fn test_lexicard_home_empty_env() {
        env::set_var("LEXICARD_HOME", "");
        let home = lexicard_home();
        env::remove_var("LEXICARD_HOME");
        assert!(home.is_some());
        assert!(home.unwrap().ends_with(".lexicard") || dirs::home_dir().is_none());
    }

    #[test]
    #[serial]
    fn test_state_path() {
        let dir = TempDir::new().unwrap();
        env::set_var("LEXICARD_HOME", dir.path());
        let path = state_path().unwrap();
        env::remove_var("LEXICARD_HOME");
        assert_eq!(path, dir.path().join("state.json"));
    }
}
