//! Durable key-value slots for the settings blob.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::TagsheetError;

/// A string-valued key-value store.
pub trait SettingsStore {
    /// Read a value. A key that was never written is `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<String>, TagsheetError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), TagsheetError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSettingsStore { dir: dir.into() }
    }

    /// The platform config directory, e.g. `~/.config/tagsheet` on Linux.
    pub fn default_location() -> Result<Self, TagsheetError> {
        let base = dirs::config_dir()
            .ok_or_else(|| TagsheetError::Store("no platform config directory".to_string()))?;
        Ok(Self::new(base.join("tagsheet")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, TagsheetError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(TagsheetError::Store(format!("invalid key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, TagsheetError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TagsheetError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), TagsheetError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| TagsheetError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| TagsheetError::Io { path, source })
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, TagsheetError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), TagsheetError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
