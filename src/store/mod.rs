pub mod json_store;

use std::collections::BTreeMap;

use anyhow::Result;

pub use json_store::JsonStore;

/// String key/value storage for progress and preferences.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Global key of the last selected dictionary.
pub const DICTIONARY_KEY: &str = "dict";
/// Global key of the last selected keyboard geometry.
pub const GEOMETRY_KEY: &str = "geometry";

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
