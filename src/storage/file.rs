//! File-based state storage for Lexicard.
//!
//! The record is stored as pretty JSON in `~/.lexicard/state.json`.
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::state_path;
use crate::error::{LexiError, Result};
use crate::storage::{Snapshot, StateStore};

/// File-based state storage.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    /// Path of the state file.
    path: PathBuf,
}

impl FileStateStore {
    /// Create a file state store at the default location.
    ///
    /// Uses `~/.lexicard/state.json` or `$LEXICARD_HOME/state.json`.
    pub fn new() -> Result<Self> {
        let path = state_path().ok_or_else(|| {
            LexiError::config("Could not determine state file location (no home directory)")
        })?;
        Self::with_path(path)
    }

    /// Create a file state store at a custom path.
    ///
    /// The parent directory is created if needed.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LexiError::storage(parent, e))?;
            }
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the path for the temp file used during atomic writes.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    /// Write the record atomically using temp file + rename.
    fn atomic_write(&self, snapshot: &Snapshot) -> Result<()> {
        let temp_path = self.temp_path();
        let json = snapshot.to_json()?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| LexiError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| LexiError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| LexiError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &self.path).map_err(|e| LexiError::storage(&self.path, e))?;

        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| LexiError::storage(&self.path, e))?;
        Ok(Snapshot::parse(&content))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.atomic_write(snapshot)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| LexiError::storage(&self.path, e))?;
        }

        let temp_path = self.temp_path();
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}
