//! File-backed string key-value store
//!
//! Provides a `KeyValueStore` that holds string pairs in memory and rewrites
//! the whole backing JSON file on `persist`.

use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name of the store inside the project config directory
const STORE_FILE_NAME: &str = "store.json";

/// Store location used when no home directory can be resolved
const FALLBACK_STORE_PATH: &str = ".topstories.json";

/// Errors that can occur when loading or persisting the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed
    #[error("Unable to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not hold a string map
    #[error("Store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String-to-string mapping persisted to a single local file
///
/// Keys are exact strings and an absent key is distinct from an empty value.
/// Writes only reach disk on `persist`, which replaces the file as a whole.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStore {
    /// Backing file, `None` for a purely in-memory store
    path: Option<PathBuf>,
    /// Current contents
    entries: BTreeMap<String, String>,
}

impl KeyValueStore {
    /// Returns the default store location
    ///
    /// Uses `~/.config/topstories/store.json` on Linux, or the equivalent
    /// platform path. Falls back to a dot-file in the working directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "topstories")
            .map(|dirs| dirs.config_dir().join(STORE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_STORE_PATH))
    }

    /// Creates a store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store from `path`
    ///
    /// A missing or empty file yields an empty store bound to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No store file yet, starting empty");
                return Ok(Self {
                    path: Some(path),
                    entries: BTreeMap::new(),
                });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let entries = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?
        };

        debug!(path = %path.display(), keys = entries.len(), "Loaded store");
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Returns the backing file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole store to its backing file
    ///
    /// The content goes to a sibling temporary file first and is then renamed
    /// over the target, so readers never observe a half-written store.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| io_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, path).map_err(io_err)?;

        debug!(path = %path.display(), keys = self.entries.len(), "Persisted store");
        Ok(())
    }
}
