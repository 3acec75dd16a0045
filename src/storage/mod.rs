//! File-backed object store.
//!
//! All live instances of every kind share one insertion-ordered mapping keyed
//! by `"<Kind>.<id>"`. The mapping is written to, and read back from, a single
//! JSON object on disk. Writes always replace the whole file.
//!
//! Saving and reloading are deliberately asymmetric: a failed save surfaces as
//! a [`StorageError`], while reload treats a missing, unreadable, or corrupt
//! file as "no prior state" and keeps whatever is already in memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{storage_key, Instance, Kind};

/// Backing file used when nothing else is configured.
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Errors raised while persisting the store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize objects: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of a [`FileStorage::reload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Entries reconstructed and registered.
    pub loaded: usize,
    /// Entries dropped because they could not be reconstructed.
    pub skipped: usize,
}

pub struct FileStorage {
    path: PathBuf,
    objects: IndexMap<String, Instance>,
}

impl FileStorage {
    /// Create an empty store backed by `path`. Nothing is read until
    /// [`reload`](Self::reload) is called.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live mapping from composite key to instance.
    pub fn all(&self) -> &IndexMap<String, Instance> {
        &self.objects
    }

    pub fn all_mut(&mut self) -> &mut IndexMap<String, Instance> {
        &mut self.objects
    }

    /// Insert or overwrite the entry at the instance's composite key.
    pub fn register(&mut self, instance: Instance) -> String {
        let key = instance.key();
        self.objects.insert(key.clone(), instance);
        key
    }

    /// Construct a fresh instance of `kind` and register it.
    pub fn new_instance(&mut self, kind: Kind) -> &mut Instance {
        let instance = Instance::new(kind);
        let (index, _) = self.objects.insert_full(instance.key(), instance);
        &mut self.objects[index]
    }

    pub fn get(&self, kind: Kind, id: &str) -> Option<&Instance> {
        self.objects.get(&storage_key(kind, id))
    }

    pub fn get_mut(&mut self, kind: Kind, id: &str) -> Option<&mut Instance> {
        self.objects.get_mut(&storage_key(kind, id))
    }

    /// Remove an instance from memory. The file is untouched until the next save.
    pub fn remove(&mut self, kind: Kind, id: &str) -> Option<Instance> {
        self.objects.shift_remove(&storage_key(kind, id))
    }

    /// Instances of one kind, or of every kind, in insertion order.
    pub fn iter_kind(&self, kind: Option<Kind>) -> impl Iterator<Item = &Instance> {
        self.objects
            .values()
            .filter(move |instance| kind.is_none_or(|k| instance.kind() == k))
    }

    pub fn count(&self, kind: Option<Kind>) -> usize {
        self.iter_kind(kind).count()
    }

    /// Write every registered instance to the backing file, replacing it.
    pub fn save(&self) -> Result<(), StorageError> {
        let document: Map<String, Value> = self
            .objects
            .iter()
            .map(|(key, instance)| (key.clone(), Value::Object(instance.to_attributes())))
            .collect();

        let json = serde_json::to_string(&document)?;
        std::fs::write(&self.path, json).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            objects = document.len(),
            "saved object store"
        );
        Ok(())
    }

    /// Refresh one instance's `updated_at`, then save the whole store.
    ///
    /// Returns `Ok(false)` without writing when no such instance is registered.
    pub fn save_instance(&mut self, kind: Kind, id: &str) -> Result<bool, StorageError> {
        let Some(instance) = self.get_mut(kind, id) else {
            return Ok(false);
        };
        instance.touch();
        self.save()?;
        Ok(true)
    }

    /// Load the backing file into memory.
    ///
    /// Each entry is reconstructed by its `__class__` discriminator and
    /// registered under its persisted key, merging into the current mapping.
    /// Entries that cannot be reconstructed are skipped. A missing file, an I/O
    /// failure, or malformed JSON leaves the mapping as it was.
    pub fn reload(&mut self) -> ReloadSummary {
        let mut summary = ReloadSummary::default();

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no object store file yet");
                return summary;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read object store, starting empty");
                return summary;
            }
        };

        let document: Map<String, Value> = match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "object store is not a JSON object, starting empty");
                return summary;
            }
        };

        for (key, value) in document {
            let Value::Object(attributes) = value else {
                tracing::warn!(%key, "skipping entry that is not an object");
                summary.skipped += 1;
                continue;
            };

            match Instance::from_attributes(attributes) {
                Ok(instance) => {
                    self.objects.insert(key, instance);
                    summary.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "skipping entry that could not be reconstructed");
                    summary.skipped += 1;
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            loaded = summary.loaded,
            skipped = summary.skipped,
            "reloaded object store"
        );
        summary
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::open(DEFAULT_FILE_PATH)
    }
}
