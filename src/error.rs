//! Unified error types for lexicard.
//!
//! Every user-facing error is recovered locally: the operation that raised it
//! aborts before mutating anything and the caller surfaces the message.
//! Persistence and speech are best-effort and go through [`FailOpen`] so that
//! a failing disk or voice never interrupts a study action.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lexicard operations.
#[derive(Error, Debug)]
pub enum LexiError {
    /// A required field was empty, or a request made no sense for the data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An imported document was not a list of well-formed card records.
    #[error("import format error: {message}")]
    ImportFormat { message: String },

    /// The text-extraction service or the speech command failed.
    #[error("external service error: {message}")]
    ExternalService { message: String },

    /// Practice session transition that is not allowed in the current state.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// I/O errors from the state file or imported documents.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for lexicard operations.
pub type Result<T> = std::result::Result<T, LexiError>;

impl LexiError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an import format error.
    pub fn import_format(message: impl Into<String>) -> Self {
        Self::ImportFormat {
            message: message.into(),
        }
    }

    /// Create an external service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error is one the learner caused and can fix by retrying
    /// with different input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LexiError::Validation { .. } | LexiError::ImportFormat { .. }
        )
    }
}

impl From<io::Error> for LexiError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LexiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for best-effort error handling.
///
/// Logs the error and returns a safe default instead of propagating it.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the lexicard CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed with a reported error.
    pub const ERROR: i32 = 1;

    /// Process panicked.
    pub const CRASH: i32 = 3;
}
