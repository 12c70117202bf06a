use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;

use crate::system::{FileSystemInterface, SettingsStore};

/// Settings persisted as a flat TOML table of string entries
pub struct FileSettingsStore<F: FileSystemInterface> {
    file_system: F,
    path: PathBuf,
}

impl<F: FileSystemInterface> FileSettingsStore<F> {
    pub fn new(file_system: F, path: PathBuf) -> Self {
        Self { file_system, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Option<Table>> {
        if !self.file_system.exists(&self.path) {
            return Ok(None);
        }

        let content = self
            .file_system
            .read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;

        let table: Table = toml::from_str(&content)
            .with_context(|| format!("Malformed settings file: {}", self.path.display()))?;
        Ok(Some(table))
    }
}

impl FileSettingsStore<crate::system::StandardFileSystem> {
    pub fn new_production(path: PathBuf) -> Self {
        Self::new(crate::system::StandardFileSystem, path)
    }
}

impl<F: FileSystemInterface + 'static> SettingsStore for FileSettingsStore<F> {
    fn read_value(&self, key: &str) -> Result<Option<String>> {
        let Some(table) = self.read_table()? else {
            debug!("Settings file {} does not exist yet", self.path.display());
            return Ok(None);
        };

        match table.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(anyhow::anyhow!(
                "Settings entry '{}' is not a string: {}",
                key,
                other
            )),
        }
    }

    fn write_value(&self, key: &str, value: &str) -> Result<()> {
        // A malformed file is not silently replaced
        let mut table = self.read_table()?.unwrap_or_default();
        table.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            self.file_system.create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(&table).context("Failed to serialize settings")?;
        self.file_system
            .write(&self.path, &content)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;

        debug!("Stored {} = {:?} in {}", key, value, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockFileSystem;

    fn store_with(content: Option<&str>) -> (MockFileSystem, FileSettingsStore<MockFileSystem>) {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/data/settings.toml");
        if let Some(content) = content {
            fs.add_file(&path, content);
        }
        (fs.clone(), FileSettingsStore::new(fs, path))
    }

    #[test]
    fn test_missing_file_reads_as_absent() {
        let (_, store) = store_with(None);
        assert_eq!(store.read_value("timer_option_key").unwrap(), None);
    }

    #[test]
    fn test_reads_string_entry() {
        let (_, store) = store_with(Some("timer_option_key = \"30 min\"\n"));
        assert_eq!(
            store.read_value("timer_option_key").unwrap(),
            Some("30 min".to_string())
        );
        assert_eq!(store.read_value("hometown_key").unwrap(), None);
    }

    #[test]
    fn test_non_string_entry_is_an_error() {
        let (_, store) = store_with(Some("timer_option_key = 30\n"));
        assert!(store.read_value("timer_option_key").is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (_, store) = store_with(Some("timer_option_key = \n"));
        let err = store.read_value("timer_option_key").unwrap_err();
        assert!(format!("{err:#}").contains("Malformed settings file"));
    }

    #[test]
    fn test_write_preserves_other_entries() {
        let (fs, store) = store_with(Some("hometown_key = \"Berlin\"\n"));

        store.write_value("timer_option_key", "10s").unwrap();

        assert_eq!(
            store.read_value("hometown_key").unwrap(),
            Some("Berlin".to_string())
        );
        assert_eq!(
            store.read_value("timer_option_key").unwrap(),
            Some("10s".to_string())
        );
        assert_eq!(
            fs.get_directory_creation_calls(),
            vec![PathBuf::from("/data")]
        );
    }

    #[test]
    fn test_write_refuses_to_clobber_malformed_file() {
        let (fs, store) = store_with(Some("not toml at all ["));

        assert!(store.write_value("timer_option_key", "10s").is_err());
        assert!(fs.get_write_calls().is_empty());
    }
}
