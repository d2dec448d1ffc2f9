//! Session persistence
//!
//! Pluggable storage for the session snapshot so a signed-in user
//! survives page reloads. The persisted document carries the user
//! descriptor and the established timestamp together; a document missing
//! either is treated as "no session". Content is trusted only until
//! `validate_session` confirms it with the backend.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShellError};
use crate::types::Session;

/// Trait for persisting the session snapshot
pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any previous snapshot
    fn save(&self, session: &Session) -> Result<()>;

    /// Load the persisted snapshot
    ///
    /// Absent, partial, or malformed state loads as `None` — stale or
    /// tampered storage must never keep the shell from starting.
    fn load(&self) -> Result<Option<Session>>;

    /// Remove any persisted snapshot
    fn clear(&self) -> Result<()>;
}

/// JSON file-based session store
///
/// Persists the session as a JSON file on disk. Atomic writes via temp
/// file + rename to prevent corruption.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file session store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;

        let tmp_path = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShellError::Storage(format!(
                    "Failed to create session directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        std::fs::write(&tmp_path, json).map_err(|e| {
            ShellError::Storage(format!(
                "Failed to write session file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            ShellError::Storage(format!(
                "Failed to rename session file {} → {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            ShellError::Storage(format!(
                "Failed to read session file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let session: Session = match serde_json::from_str(&json) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed session file, treating as no session"
                );
                return Ok(None);
            }
        };

        // Both fields or nothing
        if session.user.is_none() || session.established_at.is_none() {
            return Ok(None);
        }

        tracing::debug!(path = %self.path.display(), "Session loaded");
        Ok(Some(session))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                ShellError::Storage(format!(
                    "Failed to remove session file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            tracing::debug!(path = %self.path.display(), "Session cleared");
        }
        Ok(())
    }
}

/// In-memory session store for testing
///
/// Stores the snapshot in memory — lost on drop, but useful for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    state: std::sync::RwLock<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let mut state = self.state.write().map_err(|e| {
            ShellError::Storage(format!("Failed to acquire session lock: {}", e))
        })?;
        *state = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        let state = self.state.read().map_err(|e| {
            ShellError::Storage(format!("Failed to acquire session lock: {}", e))
        })?;
        Ok(state
            .clone()
            .filter(|s| s.user.is_some() && s.established_at.is_some()))
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.write().map_err(|e| {
            ShellError::Storage(format!("Failed to acquire session lock: {}", e))
        })?;
        *state = None;
        Ok(())
    }
}
