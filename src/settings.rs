//! Persistence of the last submitted filters.
//!
//! [`SettingsStore`] writes and reads the three filter fields under the fixed
//! keys `country`, `text`, and `category` in a [`KeyValueStore`]. Two stores
//! are provided:
//!
//! - [`FileStore`]: a flat JSON object on disk, durable across runs
//! - [`MemoryStore`]: a `HashMap`, used in tests

use crate::models::PersistedSettings;
use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const KEY_COUNTRY: &str = "country";
pub const KEY_TEXT: &str = "text";
pub const KEY_CATEGORY: &str = "category";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Write every entry, or none of them when the store fails.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// JSON file backed store. The whole file is rewritten on every write, and
/// the in-memory entries only change once the file write succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        info!(keys = entries.len(), "Opened settings store");
        Ok(Self { path, entries })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut staged = self.entries.clone();
        for (key, value) in entries {
            staged.insert(key.to_string(), value.to_string());
        }
        self.flush(&staged)?;
        self.entries = staged;
        Ok(())
    }
}

/// Reads and writes the persisted filter fields.
#[derive(Debug)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S> SettingsStore<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrite all three persisted fields.
    #[instrument(level = "info", skip(self))]
    pub fn save(&mut self, country: &str, text: &str, category: &str) -> Result<(), StoreError> {
        self.store.set_many(&[
            (KEY_COUNTRY, country),
            (KEY_TEXT, text),
            (KEY_CATEGORY, category),
        ])?;
        debug!("Persisted filter settings");
        Ok(())
    }

    /// The persisted filters, or `None` when none of the keys were ever written.
    pub fn restore(&self) -> Option<PersistedSettings> {
        let country = self.store.get(KEY_COUNTRY);
        let text = self.store.get(KEY_TEXT);
        let category = self.store.get(KEY_CATEGORY);

        if country.is_none() && text.is_none() && category.is_none() {
            return None;
        }
        Some(PersistedSettings {
            country: country.unwrap_or_default(),
            text: text.unwrap_or_default(),
            category: category.unwrap_or_default(),
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
