//! Key -> boolean persistence

use crate::error::InteractResult;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flat key -> boolean store, as used for checklist state
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> InteractResult<Option<bool>>;

    fn set(&mut self, key: &str, value: bool) -> InteractResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> InteractResult<Option<bool>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: bool) -> InteractResult<()> {
        (**self).set(key, value)
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, bool> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> InteractResult<Option<bool>> {
        Ok(self.entries.get(key).copied())
    }

    fn set(&mut self, key: &str, value: bool) -> InteractResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
///
/// The whole object is rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing or unreadable file starts empty; non-boolean entries are dropped.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable state file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    fn load(path: &Path) -> InteractResult<BTreeMap<String, bool>> {
        if !path.exists() {
            debug!("No state file at {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(path)?;
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Bool(checked) => Some((key, checked)),
                // Older writers stored the flag as a string
                serde_json::Value::String(text) if text == "true" || text == "false" => Some((key, text == "true")),
                other => {
                    debug!("Dropping non-boolean state entry {} = {}", key, other);
                    None
                }
            })
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> InteractResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> InteractResult<Option<bool>> {
        Ok(self.entries.get(key).copied())
    }

    fn set(&mut self, key: &str, value: bool) -> InteractResult<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }
}
