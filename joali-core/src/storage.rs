//! Key-value storage backing the session
//!
//! The contract mirrors browser local storage: reads return `None` for a
//! missing key, writes never fail from the caller's point of view. Backends:
//! - `MemoryStorage`: process-local, lost on exit
//! - `FileStorage`: JSON file, rewritten on every mutation
//! - `NullStorage`: no storage available, every call is a no-op

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persisted key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Write several keys as one update
    ///
    /// Persistent backends must write the whole batch at once, so a crash
    /// never leaves only part of it on disk.
    fn set_many(&self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Remove every listed key; missing keys are ignored
    fn clear(&self, keys: &[&str]);
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }

    fn set_many(&self, batch: &[(&str, &str)]) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for (key, value) in batch {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn clear(&self, keys: &[&str]) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.remove(*key);
        }
    }
}

/// Storage used when nothing can be persisted
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

impl KeyValueStore for NullStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn clear(&self, _keys: &[&str]) {}
}

/// JSON-file storage
///
/// The whole map is held in memory and written back after each mutation via
/// a temp file + rename, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`
    ///
    /// A missing file starts empty. A corrupt file is logged and treated as
    /// empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Err(e) = write_atomic(&self.path, entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist session file");
        }
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn set_many(&self, batch: &[(&str, &str)]) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for (key, value) in batch {
            entries.insert(key.to_string(), value.to_string());
        }
        self.persist(&entries);
    }

    fn clear(&self, keys: &[&str]) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.persist(&entries);
        }
    }
}

fn write_atomic(path: &Path, entries: &HashMap<String, String>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
