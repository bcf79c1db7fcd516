//! Store adapters: one named text slot in a persistent key-value store.
//!
//! Rules:
//!   - A store is bound to a single slot at construction
//!   - Absence is `Ok(None)`, never an error
//!   - A `set` that returns `Ok` is visible to the next `get`
//!
//! Backends: `MemoryStore` (in-process), `FileStore` (one file per slot,
//! atomic replace), `LocalStorage` (browser, wasm32 only).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::DEFAULT_SLOT_KEY;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save slot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save storage unavailable: {0}")]
    Unavailable(String),
}

/// Get/set of one fixed slot.
pub trait SaveStore {
    /// Key of the slot this store is bound to.
    fn slot_key(&self) -> &str;
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&mut self, text: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Slot held in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    slot: Option<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_key(DEFAULT_SLOT_KEY)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store bound to `slot_key`.
    pub fn with_key(slot_key: impl Into<String>) -> Self {
        Self {
            key: slot_key.into(),
            slot: None,
        }
    }

    /// Store pre-seeded with `text`.
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            slot: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn slot_key(&self) -> &str {
        &self.key
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.clone())
    }

    fn set(&mut self, text: &str) -> Result<(), StoreError> {
        self.slot = Some(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Slot stored as `<dir>/<slot_key>.sav`.
///
/// Writes go to a sibling temp file, are fsynced, then renamed over the
/// slot, so a crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    key: String,
    path: PathBuf,
}

impl FileStore {
    /// Bind to `slot_key` inside `dir`. Creates `dir` if needed.
    pub fn open(dir: &Path, slot_key: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            key: slot_key.to_string(),
            path: dir.join(format!("{}.sav", slot_key)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("sav.tmp")
    }
}

impl SaveStore for FileStore {
    fn slot_key(&self) -> &str {
        &self.key
    }

    /// Bytes that are not UTF-8 come back lossily converted. They are slot
    /// corruption for the codec to reject, not an I/O failure.
    fn get(&self) -> Result<Option<String>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, text: &str) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Browser localStorage
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{SaveStore, StoreError};

    /// Slot stored under `slot_key` in `window.localStorage`.
    #[derive(Debug, Clone)]
    pub struct LocalStorage {
        key: String,
    }

    impl LocalStorage {
        pub fn new(slot_key: impl Into<String>) -> Self {
            Self {
                key: slot_key.into(),
            }
        }

        fn storage() -> Result<web_sys::Storage, StoreError> {
            web_sys::window()
                .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
                .local_storage()
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
                .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
        }
    }

    impl SaveStore for LocalStorage {
        fn slot_key(&self) -> &str {
            &self.key
        }

        fn get(&self) -> Result<Option<String>, StoreError> {
            Self::storage()?
                .get_item(&self.key)
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
        }

        fn set(&mut self, text: &str) -> Result<(), StoreError> {
            Self::storage()?
                .set_item(&self.key, text)
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
        }
    }
}
