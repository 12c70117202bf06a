use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::system::traits::{FileSystemInterface, HostControl, SettingsStore};

/// Mock file system for testing - an in-memory file map with call recording
#[derive(Clone, Default)]
pub struct MockFileSystem {
    pub files: Arc<Mutex<HashMap<PathBuf, String>>>,
    pub read_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub write_calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub directory_creation_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub should_fail_read: Arc<AtomicBool>,
    pub should_fail_write: Arc<AtomicBool>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock file system
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    pub fn remove_file<P: AsRef<Path>>(&self, path: P) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    pub fn file_content<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn file_exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.lock().unwrap().contains_key(path.as_ref())
    }

    pub fn get_read_calls(&self) -> Vec<PathBuf> {
        self.read_calls.lock().unwrap().clone()
    }

    pub fn get_write_calls(&self) -> Vec<(PathBuf, String)> {
        self.write_calls.lock().unwrap().clone()
    }

    pub fn get_directory_creation_calls(&self) -> Vec<PathBuf> {
        self.directory_creation_calls.lock().unwrap().clone()
    }

    /// Configure the mock to fail read operations
    pub fn set_read_failure(&self, should_fail: bool) {
        self.should_fail_read.store(should_fail, Ordering::Relaxed);
    }

    /// Configure the mock to fail write operations
    pub fn set_write_failure(&self, should_fail: bool) {
        self.should_fail_write.store(should_fail, Ordering::Relaxed);
    }
}

impl FileSystemInterface for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_calls.lock().unwrap().push(path.to_path_buf());

        if self.should_fail_read.load(Ordering::Relaxed) {
            return Err(anyhow::anyhow!("Mock read failure"));
        }

        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.write_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));

        if self.should_fail_write.load(Ordering::Relaxed) {
            return Err(anyhow::anyhow!("Mock write failure"));
        }

        self.add_file(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.file_exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.directory_creation_calls
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        Ok(())
    }
}

/// Mock settings store - a shared key-value map with read counting
#[derive(Clone, Default)]
pub struct MockSettingsStore {
    pub values: Arc<Mutex<HashMap<String, String>>>,
    pub read_count: Arc<AtomicUsize>,
    pub should_fail_read: Arc<AtomicBool>,
    /// While true, reads block after being counted
    pub read_gate: Arc<(Mutex<bool>, Condvar)>,
}

impl MockSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.set(key, value);
        store
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }

    pub fn get_read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn set_read_failure(&self, should_fail: bool) {
        self.should_fail_read.store(should_fail, Ordering::SeqCst);
    }

    /// Park every following read until [`release_reads`](Self::release_reads)
    pub fn hold_reads(&self) {
        *self.read_gate.0.lock().unwrap() = true;
    }

    pub fn release_reads(&self) {
        let (held, released) = &*self.read_gate;
        *held.lock().unwrap() = false;
        released.notify_all();
    }
}

impl SettingsStore for MockSettingsStore {
    fn read_value(&self, key: &str) -> Result<Option<String>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);

        let (held, released) = &*self.read_gate;
        let mut is_held = held.lock().unwrap();
        while *is_held {
            is_held = released.wait(is_held).unwrap();
        }
        drop(is_held);

        if self.should_fail_read.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock settings read failure"));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn write_value(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value);
        Ok(())
    }
}

/// Mock host - counts stop requests instead of stopping anything
#[derive(Clone, Default)]
pub struct MockHost {
    pub stop_requests: Arc<AtomicUsize>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_stop_request_count(&self) -> usize {
        self.stop_requests.load(Ordering::SeqCst)
    }
}

impl HostControl for MockHost {
    fn request_stop(&self) {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
    }
}
