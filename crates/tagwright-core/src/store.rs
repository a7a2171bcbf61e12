//! Durable per-source record of every fetched result.
//!
//! The store is a single JSON file mapping a source name to the list of
//! records ever appended for it. Every read loads the whole file and every
//! write rewrites it. A missing file reads as empty, and so does a
//! malformed one (with an error logged); the next write replaces it.
//!
//! All operations on one store instance are serialized behind one mutex.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Source name to appended records, in append order.
pub type StoreContents = BTreeMap<String, Vec<Value>>;

/// An append-only, file-backed metadata store.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MetadataStore {
    /// A store backed by the file at `path`. The file is created on the
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record under `source` and persist the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be written.
    pub fn add_metadata(&self, source: &str, record: Value) -> Result<()> {
        let _guard = self.guard();

        let mut contents = self.load();
        contents.entry(source.to_string()).or_default().push(record);
        self.save(&contents)?;

        log::debug!(
            "Stored record for {} ({} total) in {}",
            source,
            contents.get(source).map_or(0, Vec::len),
            self.path.display()
        );
        Ok(())
    }

    /// All records appended under `source`, oldest first.
    pub fn get_metadata(&self, source: &str) -> Vec<Value> {
        let _guard = self.guard();
        self.load().remove(source).unwrap_or_default()
    }

    /// Every source and its records.
    pub fn get_all_metadata(&self) -> StoreContents {
        let _guard = self.guard();
        self.load()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> StoreContents {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return StoreContents::new(),
            Err(e) => {
                log::error!("Error reading store {}: {}", self.path.display(), e);
                return StoreContents::new();
            }
        };

        if text.trim().is_empty() {
            return StoreContents::new();
        }

        match serde_json::from_str(&text) {
            Ok(contents) => contents,
            Err(e) => {
                log::error!("Error decoding JSON store {}: {}", self.path.display(), e);
                StoreContents::new()
            }
        }
    }

    fn save(&self, contents: &StoreContents) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        contents.serialize(&mut serializer)?;
        buf.push(b'\n');

        let tmp_path = self.tmp_path();
        let written = fs::write(&tmp_path, &buf).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    log::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
