//! Persistence of the face status across restarts.

use crate::status::Status;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors from a [`StateStore`].
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    Io(io::Error),
    /// The stored record is not a valid status.
    Parse(serde_json::Error),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "state storage I/O failed: {}", err),
            StoreError::Parse(err) => write!(f, "stored state is corrupt: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err)
    }
}

/// Storage for a single status record.
pub trait StateStore {
    /// Replaces the stored record.
    fn save(&mut self, status: &Status) -> Result<(), StoreError>;

    /// Returns the stored record, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    /// Returns [`StoreError::Parse`] if a record exists but cannot be decoded.
    fn load(&self) -> Result<Option<Status>, StoreError>;
}

/// Stores the status as a flat JSON object in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn save(&mut self, status: &Status) -> Result<(), StoreError> {
        let json = serde_json::to_string(status)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "wrote face state file");
        Ok(())
    }

    fn load(&self) -> Result<Option<Status>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

/// In-memory store holding the serialized record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with raw text, for exercising corrupt records.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.record.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn save(&mut self, status: &Status) -> Result<(), StoreError> {
        self.record = Some(serde_json::to_string(status)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<Status>, StoreError> {
        match &self.record {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }
}
