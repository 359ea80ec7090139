//! Persistence for the single compass record.
//!
//! The record is stored as one JSON document. Writes go through a temp file in
//! the same directory followed by a rename, so a reader sees either the old
//! record or the new one and never a mix of the two.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{LoadError, StoreError};
use crate::record::CompassRecord;

/// Default file name inside the data directory.
pub const STATE_FILE: &str = "compass_state.json";

/// Backing storage for the compass record.
pub trait StateStore {
    /// Read the persisted record.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing why no record could be read.
    fn load(&self) -> Result<CompassRecord, LoadError>;

    /// Replace the persisted record as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the record was not durably written.
    fn store(&self, record: &CompassRecord) -> Result<(), StoreError>;
}

/// Load the record, substituting defaults for the recoverable failure kinds.
///
/// Missing, unreadable and corrupt state all yield [`CompassRecord::default`].
/// Any other I/O failure is returned to the caller.
///
/// # Errors
///
/// Returns [`LoadError::Io`] for unexpected read failures.
pub fn load_or_default<S: StateStore + ?Sized>(store: &S) -> Result<CompassRecord, LoadError> {
    match store.load() {
        Ok(record) => Ok(record),
        Err(LoadError::NotFound { path }) => {
            tracing::debug!(path = %path.display(), "no state file yet, starting from defaults");
            Ok(CompassRecord::default())
        }
        Err(err) if err.is_recoverable() => {
            tracing::warn!(error = %err, "discarding unusable state, starting from defaults");
            Ok(CompassRecord::default())
        }
        Err(err) => Err(err),
    }
}

/// JSON file store at an explicit path.
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

    fn write_atomically(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<CompassRecord, LoadError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            let path = self.path.clone();
            match source.kind() {
                io::ErrorKind::NotFound => LoadError::NotFound { path },
                io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidData => {
                    LoadError::Unreadable { path, source }
                }
                _ => LoadError::Io { path, source },
            }
        })?;

        CompassRecord::from_json_str(&content).map_err(|e| LoadError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn store(&self, record: &CompassRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        self.write_atomically(&bytes)
            .map_err(|source| StoreError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), "state written");
        Ok(())
    }
}

/// In-process store, for embedding and tests.
///
/// Writes can be made to fail on demand to exercise the lost-commit path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RefCell<Option<CompassRecord>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CompassRecord) -> Self {
        Self {
            record: RefCell::new(Some(record)),
            fail_writes: Cell::new(false),
        }
    }

    /// Make every following `store` call fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn snapshot(&self) -> Option<CompassRecord> {
        self.record.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<CompassRecord, LoadError> {
        self.record
            .borrow()
            .clone()
            .ok_or_else(|| LoadError::NotFound {
                path: PathBuf::from("<memory>"),
            })
    }

    fn store(&self, record: &CompassRecord) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::WriteFailed {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("writes disabled"),
            });
        }
        *self.record.borrow_mut() = Some(record.clone());
        Ok(())
    }
}
