//! Key-value storage backends
//!
//! The persistence gateway talks to a string-keyed get/set/remove backend.
//! `FileBackend` keeps one file per key under the store directory and uses
//! atomic writes (write to temp file, then rename) to prevent corruption.
//! `MemoryBackend` backs tests.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::{StorageError, StorageResult};

/// String-keyed storage, the shape of a browser local store
pub trait KeyValueBackend: Send + Sync {
    /// Read the value for a key, `None` when absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Write the value for a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Remove a key; removing an absent key is a no-op
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Backend that stores each key as a file under a root directory
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at the given directory, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|source| StorageError::CreateDirectory {
                path: root.clone(),
                source,
            })?;
        }
        Ok(Self { root })
    }

    /// The directory keys are stored under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// In-memory backend for tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path()).unwrap();

        assert!(backend.get("tomo_guest_books").unwrap().is_none());

        backend.set("tomo_guest_books", "[]").unwrap();
        assert_eq!(
            backend.get("tomo_guest_books").unwrap().as_deref(),
            Some("[]")
        );

        backend.set("tomo_guest_books", r#"[{"id":"x"}]"#).unwrap();
        assert_eq!(
            backend.get("tomo_guest_books").unwrap().as_deref(),
            Some(r#"[{"id":"x"}]"#)
        );

        backend.remove("tomo_guest_books").unwrap();
        assert!(backend.get("tomo_guest_books").unwrap().is_none());

        // Removing again is a no-op
        backend.remove("tomo_guest_books").unwrap();
    }

    #[test]
    fn test_file_backend_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("store");
        let backend = FileBackend::new(&nested).unwrap();
        assert!(nested.exists());

        backend.set("key", "value").unwrap();
        assert_eq!(backend.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_backend_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path()).unwrap();
        backend.set("key", "value").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());

        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(backend.len(), 1);

        backend.remove("k").unwrap();
        assert!(backend.get("k").unwrap().is_none());
    }
}
