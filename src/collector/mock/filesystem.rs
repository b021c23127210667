//! In-memory mock filesystem for testing the collector without a real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Entries {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Every ancestor directory of a stored file.
    directories: HashSet<PathBuf>,
}

/// In-memory filesystem for testing.
///
/// Clones share the same backing store, so a test can hand one clone to a
/// collector and keep rewriting `/proc/stat` through another between cycles.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    entries: Arc<RwLock<Entries>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock filesystem with a single `/proc/stat` file.
    pub fn with_stat(content: impl Into<String>) -> Self {
        let fs = Self::new();
        fs.set_stat(content);
        fs
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a file. Parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.write();

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                entries.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        entries.files.insert(path, content.into());
    }

    /// Replaces the contents of `/proc/stat`.
    pub fn set_stat(&self, content: impl Into<String>) {
        self.add_file("/proc/stat", content);
    }

    /// Removes a file; directories are left in place.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.write().files.remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.read().files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let entries = self.read();
        entries.files.contains_key(path) || entries.directories.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu 1 2 3 4 5 6 7 8 9 10\n");

        assert!(fs.exists(Path::new("/proc/stat")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/stat")).unwrap();
        assert_eq!(content, "cpu 1 2 3 4 5 6 7 8 9 10\n");
    }

    #[test]
    fn test_mock_fs_clones_share_contents() {
        let fs = MockFs::with_stat("first");
        let handle = fs.clone();
        handle.set_stat("second");

        let content = fs.read_to_string(Path::new("/proc/stat")).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn test_mock_fs_remove_file() {
        let fs = MockFs::with_stat("cpu 1 2 3 4 5 6 7 8 9 10");
        fs.remove_file("/proc/stat");
        assert!(!fs.exists(Path::new("/proc/stat")));
        assert!(fs.exists(Path::new("/proc")));
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
