use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::PersistenceStore;

const STATE_FILE: &str = "state.json";

/// Key/value store kept in a single JSON object on disk. Every `set` rewrites
/// the file atomically.
pub struct JsonStore {
    base_dir: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quackr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating {}", base_dir.display()))?;
        let mut store = Self {
            base_dir,
            values: BTreeMap::new(),
        };
        store.values = store.load();
        Ok(store)
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(STATE_FILE)
    }

    /// A corrupt state file starts over empty rather than failing startup.
    fn load(&self) -> BTreeMap<String, String> {
        let path = self.file_path();
        if !path.exists() {
            return BTreeMap::new();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
                BTreeMap::new()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read state file");
                BTreeMap::new()
            }
        }
    }

    fn save(&self) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(&self.values)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl PersistenceStore for JsonStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            // keep memory in step with the file
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e).with_context(|| format!("saving {}", self.file_path().display()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_values_survive_reopen() {
        let (dir, mut store) = make_test_store();
        store.set("qwerty.level", "8").unwrap();
        store.set("qwerty.quacks", "3").unwrap();

        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("qwerty.level").as_deref(), Some("8"));
        assert_eq!(reopened.get("qwerty.quacks").as_deref(), Some("3"));
        assert_eq!(reopened.get("dict"), None);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let (dir, mut store) = make_test_store();
        store.set("dict", "en").unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "{not json").unwrap();
        let mut store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get("qwerty.level"), None);
        store.set("qwerty.level", "4").unwrap();
        assert_eq!(store.get("qwerty.level").as_deref(), Some("4"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let (dir, mut store) = make_test_store();
        store.base_dir = dir.path().join("gone");
        let err = store.set("dict", "fr").unwrap_err();
        assert!(err.to_string().contains("saving"));
        assert_eq!(store.get("dict"), None);
    }

    #[test]
    fn test_retry_after_failed_write_reaches_disk() {
        let (dir, mut store) = make_test_store();
        store.set("qwerty.level", "6").unwrap();
        store.base_dir = dir.path().join("gone");
        assert!(store.set("qwerty.level", "8").is_err());
        assert_eq!(store.get("qwerty.level").as_deref(), Some("6"));

        store.base_dir = dir.path().to_path_buf();
        store.set("qwerty.level", "8").unwrap();
        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("qwerty.level").as_deref(), Some("8"));
    }
}
