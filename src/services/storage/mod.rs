//! Key/value persistence for the planner document and the reminder log.
//!
//! Each key holds one JSON text. Reads that find nothing usable are reported
//! as "no prior state" so callers fall back to defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

/// Key of the planner document.
pub const STATE_KEY: &str = "plannerState";
/// Key of the fired-reminder log.
pub const NOTIFIED_KEY: &str = "plannerNotifiedMap";

/// Minimal storage primitive: whole-value read and write by key.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Reads `key` and parses it as JSON. Missing keys, read failures and
/// malformed JSON all yield `None`.
pub fn read_json<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<Value> {
    let text = match store.read(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read {}: {:#}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed JSON stored under {}: {}", key, e);
            None
        }
    }
}

pub fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: serde::Serialize,
{
    let data = serde_json::to_string(value).with_context(|| format!("failed to serialize {key}"))?;
    store.write(key, &data)
}

/// One `<key>.json` file per key inside a directory.
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

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(data))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
