use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// String key-value store. Writes are fire-and-forget.
pub trait PreferenceStore {
    fn read_string(&self, key: &str) -> Option<String>;
    fn write_string(&mut self, key: &str, value: &str);
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Box<P> {
    fn read_string(&self, key: &str) -> Option<String> {
        (**self).read_string(key)
    }

    fn write_string(&mut self, key: &str, value: &str) {
        (**self).write_string(key, value)
    }
}

/// Preferences kept as a flat JSON object on disk.
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonPreferenceStore {
    /// Opens the file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring settings file: {err:#}");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create settings dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.values)
            .context("failed to serialize settings")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

impl PreferenceStore for JsonPreferenceStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save() {
            tracing::warn!(key, "failed to persist preference: {err:#}");
        }
    }
}

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

pub fn default_settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("failed to resolve config dir")?;
    Ok(base.join("itask").join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");

        let mut store = JsonPreferenceStore::open(&path);
        assert_eq!(store.read_string("theme_mode"), None);
        store.write_string("theme_mode", "DARK");

        let reopened = JsonPreferenceStore::open(&path);
        assert_eq!(reopened.read_string("theme_mode").as_deref(), Some("DARK"));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut store = JsonPreferenceStore::open(&path);
        assert_eq!(store.read_string("theme_mode"), None);

        store.write_string("theme_mode", "LIGHT");
        let reopened = JsonPreferenceStore::open(&path);
        assert_eq!(reopened.read_string("theme_mode").as_deref(), Some("LIGHT"));
    }

    #[test]
    fn last_write_wins() {
        let mut store = InMemoryPreferenceStore::default();
        store.write_string("k", "a");
        store.write_string("k", "b");
        assert_eq!(store.read_string("k").as_deref(), Some("b"));
    }
}
