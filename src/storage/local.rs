use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to replace storage file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// String key/value store with browser local-storage semantics, mirrored to a
/// JSON file on every write. Without a backing path it lives in memory only.
#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items: BTreeMap<String, String> = match fs::read(&path) {
            Ok(raw) if raw.is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_slice(&raw) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(
                        target: "storage",
                        path = %path.display(),
                        error = %err,
                        "storage file is corrupt; starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            items: Mutex::new(items),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.into());
        self.flush(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }

    /// Reads a flag stored as `"true"` / `"false"`; anything else is false.
    pub fn get_flag(&self, key: &str) -> bool {
        self.get_item(key).as_deref() == Some("true")
    }

    pub fn set_flag(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.set_item(key, value.to_string())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, raw)
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_atomically(path, &serde_json::to_vec_pretty(items)?)
    }
}

/// Writes `payload` next to `path` and renames it into place.
pub fn write_atomically(path: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(payload)?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}
