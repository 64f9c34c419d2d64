//! Durable layout storage.
//!
//! One record per gallery, keyed by [`storage_key`], holding the JSON
//! serialized overlay (`[{"id": …, "size": …}, {"type": "spacer", …}]`).
//! The same [`LayoutStore`] trait backs the editor's local state and the
//! proxy's remote state.
//!
//! ## Corruption
//!
//! A record that fails to parse is reported as [`StoreError::Corrupt`].
//! Callers restoring a layout go through [`load_or_discard`], which logs the
//! problem and carries on as if nothing had been saved: the gallery falls
//! back to canonical order and the next save overwrites the bad record.
//!
//! ## Storage
//!
//! [`FileStore`] keeps one file per gallery in a directory:
//!
//! ```text
//! .gallery-layouts/
//! ├── gallery-layout-summer.json
//! └── gallery-layout-portraits.json
//! ```
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write never leaves a half-written record.

use crate::types::{SavedEntry, is_valid_gallery_id};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt saved layout for '{gallery}': {reason}")]
    Corrupt { gallery: String, reason: String },
    #[error("Invalid gallery id: {0:?}")]
    InvalidId(String),
}

/// Storage key for a gallery's overlay.
pub fn storage_key(gallery_id: &str) -> String {
    format!("gallery-layout-{gallery_id}")
}

pub trait LayoutStore {
    /// Load the overlay for a gallery. `Ok(None)` when nothing was saved.
    fn load(&self, gallery_id: &str) -> Result<Option<Vec<SavedEntry>>, StoreError>;

    /// Replace the overlay for a gallery.
    fn save(&self, gallery_id: &str, entries: &[SavedEntry]) -> Result<(), StoreError>;

    /// Remove the overlay for a gallery. Removing a missing record is not an error.
    fn delete(&self, gallery_id: &str) -> Result<(), StoreError>;
}

/// Load an overlay, treating unreadable or corrupt records as absent.
pub fn load_or_discard<S: LayoutStore + ?Sized>(
    store: &S,
    gallery_id: &str,
) -> Option<Vec<SavedEntry>> {
    match store.load(gallery_id) {
        Ok(saved) => saved,
        Err(err) => {
            warn!(gallery = gallery_id, "discarding saved layout: {err}");
            None
        }
    }
}

fn parse_record(gallery_id: &str, raw: &str) -> Result<Vec<SavedEntry>, StoreError> {
    serde_json::from_str(raw).map_err(|err| StoreError::Corrupt {
        gallery: gallery_id.to_string(),
        reason: err.to_string(),
    })
}

fn check_id(gallery_id: &str) -> Result<(), StoreError> {
    if is_valid_gallery_id(gallery_id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId(gallery_id.to_string()))
    }
}

// ============================================================================
// File store
// ============================================================================

/// One JSON file per gallery in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, gallery_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(gallery_id)))
    }
}

impl LayoutStore for FileStore {
    fn load(&self, gallery_id: &str) -> Result<Option<Vec<SavedEntry>>, StoreError> {
        check_id(gallery_id)?;
        let path = self.record_path(gallery_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        parse_record(gallery_id, &raw).map(Some)
    }

    fn save(&self, gallery_id: &str, entries: &[SavedEntry]) -> Result<(), StoreError> {
        check_id(gallery_id)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(gallery_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(entries)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!(gallery = gallery_id, entries = entries.len(), "saved layout");
        Ok(())
    }

    fn delete(&self, gallery_id: &str) -> Result<(), StoreError> {
        check_id(gallery_id)?;
        match fs::remove_file(self.record_path(gallery_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Raw JSON records in memory. Used by tests and embedded hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw record without validation.
    pub fn insert_raw(&self, gallery_id: &str, raw: impl Into<String>) {
        self.lock().insert(storage_key(gallery_id), raw.into());
    }

    /// Raw record as stored, if any.
    pub fn raw(&self, gallery_id: &str) -> Option<String> {
        self.lock().get(&storage_key(gallery_id)).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self, gallery_id: &str) -> Result<Option<Vec<SavedEntry>>, StoreError> {
        check_id(gallery_id)?;
        match self.raw(gallery_id) {
            Some(raw) => parse_record(gallery_id, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, gallery_id: &str, entries: &[SavedEntry]) -> Result<(), StoreError> {
        check_id(gallery_id)?;
        let json = serde_json::to_string(entries)?;
        self.lock().insert(storage_key(gallery_id), json);
        Ok(())
    }

    fn delete(&self, gallery_id: &str) -> Result<(), StoreError> {
        check_id(gallery_id)?;
        self.lock().remove(&storage_key(gallery_id));
        Ok(())
    }
}
