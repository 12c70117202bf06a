use anyhow::Result;
use std::path::Path;

/// Trait for file system operations - abstracts std::fs for testability
pub trait FileSystemInterface: Send + Sync {
    /// Read the entire contents of a file
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the contents of a file
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all of its parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Trait for the durable key-value settings mechanism
///
/// Implementations may block; async callers move them off the executor.
pub trait SettingsStore: Send + Sync + 'static {
    /// Fetch a string entry, `None` when the key is absent
    fn read_value(&self, key: &str) -> Result<Option<String>>;

    fn write_value(&self, key: &str, value: &str) -> Result<()>;
}

/// Trait for the process hosting the scheduler
pub trait HostControl: Send + Sync + 'static {
    /// Ask the host to shut itself down; fire-and-forget
    fn request_stop(&self);
}
