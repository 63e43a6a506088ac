//! Preference storage: a best-effort string key-value store.
//!
//! - `MemoryStore`   : process-local map (tests, one-shot runs)
//! - `JsonFileStore` : whole map persisted as one JSON object on disk
//! - `NullStore`     : always empty, writes dropped (restricted contexts)
//!
//! Reads and writes never fail from the caller's point of view; problems are
//! logged under the `store` target and the caller falls back to defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const KEY_RANKING_LOG: &str = "sommelier.ranking_log.v1";
pub const KEY_ADAPTIVE_WEIGHTS: &str = "sommelier.adaptive_weights.v1";
pub const KEY_EXPERIMENT_GROUP: &str = "sommelier.ab_group.v1";
pub const KEY_RECENT_RECOMMENDATIONS: &str = "sommelier.recent_recommendations.v1";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Decode a stored JSON value; missing or malformed → `None`.
pub fn get_json<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(target: "store", key, error = %e, "ignoring malformed stored value");
            None
        }
    }
}

pub fn set_json<T: Serialize + ?Sized>(store: &dyn PreferenceStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => warn!(target: "store", key, error = %e, "failed to encode value"),
    }
}

/* ---- In-memory ---- */

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut m) = self.inner.lock() {
            m.insert(key.to_string(), value.to_string());
        }
    }
}

/* ---- JSON file ---- */

/// File-backed store. The map is loaded once; every `set` rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. An unreadable or corrupt
    /// file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(target: "store", path = %path.display(), error = %e, "corrupt store file, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            inner: Mutex::new(map),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, map: &BTreeMap<String, String>) {
        let write = || -> std::io::Result<()> {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            let raw = serde_json::to_string_pretty(map)?;
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, raw)?;
            fs::rename(&tmp, &self.path)
        };
        if let Err(e) = write() {
            warn!(target: "store", path = %self.path.display(), error = %e, "failed to persist store");
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut m) = self.inner.lock() else {
            return;
        };
        m.insert(key.to_string(), value.to_string());
        self.persist(&m);
    }
}

/* ---- Null ---- */

#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl PreferenceStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}
}
