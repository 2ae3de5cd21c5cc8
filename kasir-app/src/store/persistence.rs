//! Persistence port
//!
//! The store serializes each collection to a JSON document and hands it
//! to a [`StatePersistence`] under a fixed key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreResult;

/// Collection keys
pub const STOCKS_KEY: &str = "stocks";
pub const ORDERS_KEY: &str = "orders";
pub const SETTINGS_KEY: &str = "settings";
pub const STAFFS_KEY: &str = "staffs";
pub const TABLES_KEY: &str = "tables";

/// Key-value storage for serialized collections
pub trait StatePersistence {
    /// Stored document for `key`, `None` when never saved
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// One `<key>.json` file per collection in a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StatePersistence for JsonFileStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        // Atomic write: tmp file + rename
        let path = self.path(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp_path, value)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Process-local storage, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, for inspection
    pub fn get(&self, key: &str) -> Option<String> {
        self.docs.lock().get(key).cloned()
    }
}

impl StatePersistence for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.docs.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.docs.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
