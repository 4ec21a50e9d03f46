//! ldk-store
//!
//! Key/value persistence for desk state (trade book, lane cache, quote items).
//!
//! The engine never owns storage. Callers inject a [`KvStore`]; values are
//! plain JSON documents so any backend that can hold a blob per key works.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StoreError {
    /// Keys are limited to ASCII letters, digits, `-` and `_`.
    InvalidKey(String),
    Io { path: PathBuf, source: std::io::Error },
    Serde { key: String, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidKey(k) => write!(f, "invalid store key '{k}'"),
            StoreError::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            StoreError::Serde { key, source } => write!(f, "json error for key '{key}': {source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::InvalidKey(_) => None,
            StoreError::Io { source, .. } => Some(source),
            StoreError::Serde { source, .. } => Some(source),
        }
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Blob store keyed by short names (`lanes`, `buys`, `sells`, ...).
pub trait KvStore {
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// `None` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

/// Serialize `value` and save it under `key`.
pub fn save_as<T: Serialize + ?Sized>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let v = serde_json::to_value(value).map_err(|source| StoreError::Serde {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &v)
}

/// Load and deserialize `key`; `None` when absent.
pub fn load_as<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.load(key)? {
        None => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|source| StoreError::Serde {
                key: key.to_string(),
                source,
            }),
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl KvStore for MemoryStore {
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// One pretty-printed `<key>.json` per key under a root directory.
///
/// The directory is created on first save. Writes go to a temp file that is
/// then renamed over the target.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KvStore for JsonDirStore {
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        check_key(key)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serde {
            key: key.to_string(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, format!("{json}\n")).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(key, path = %path.display(), "saved");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Serde {
                key: key.to_string(),
                source,
            })
    }
}
