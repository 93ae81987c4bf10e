use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;

use crate::host::SettingsStore;

/// Process-local store; forgets everything on exit
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    options: Mutex<HashMap<String, serde_json::Value>>,
}

impl SettingsStore for InMemorySettingsStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<serde_json::Value>, anyhow::Error> {
        let options = self
            .options
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?;
        Ok(options.get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), anyhow::Error> {
        self.options
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// All options in a single JSON object on disk. A missing file reads as an
/// empty store; it is created on the first `put`.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    // serialises read-modify-write within this process; other processes
    // writing the same file are not coordinated with
    lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<serde_json::Map<String, serde_json::Value>, anyhow::Error> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("could not read {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON object", self.path.display()))
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<serde_json::Value>, anyhow::Error> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn put(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), anyhow::Error> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?;
        let mut options = self.read_all()?;
        options.insert(key.to_string(), value);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(&options)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("could not write {}", self.path.display()))?;
        Ok(())
    }
}
