//! JSON-file backed config store

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigStore;

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Config store persisted as `{ "<key/path>": { "<name>": "<value>" } }`
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    key: String,
}

impl FileConfigStore {
    /// Root key of the store at `path`; the file is created on first write
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: String::new(),
        }
    }

    /// Slash-separated path of this key ("" for the root)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_sections(&self) -> Result<Sections> {
        if !self.path.exists() {
            return Ok(Sections::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config store {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Sections::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config store {}", self.path.display()))
    }

    fn write_sections(&self, sections: &Sections) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config store directory")?;
        }
        let json =
            serde_json::to_string_pretty(sections).context("Failed to serialize config store")?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write config store")?;
        fs::rename(&temp_path, &self.path).context("Failed to replace config store")?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn create_sub_key(&self, name: &str) -> Result<Box<dyn ConfigStore>> {
        let key = if self.key.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key, name)
        };

        let mut sections = self.read_sections()?;
        if !sections.contains_key(&key) {
            sections.insert(key.clone(), BTreeMap::new());
            self.write_sections(&sections)?;
        }

        Ok(Box::new(FileConfigStore {
            path: self.path.clone(),
            key,
        }))
    }

    fn set_value(&self, name: &str, value: &str) -> Result<()> {
        let mut sections = self.read_sections()?;
        sections
            .entry(self.key.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self.write_sections(&sections)
    }

    fn get_value(&self, name: &str) -> Result<Option<String>> {
        let sections = self.read_sections()?;
        Ok(sections
            .get(&self.key)
            .and_then(|values| values.get(name))
            .cloned())
    }
}
