//! Reader for `/proc/stat` CPU counters.

use crate::collector::procfs::parser::parse_cpu_stat;
use crate::collector::traits::FileSystem;
use crate::model::Snapshot;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Errors that abort a collection cycle.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading the counter source.
    Io(std::io::Error),
    /// The counter source does not exist under the configured proc root.
    SourceMissing(String),
    /// The counter source is empty or cannot be parsed.
    MalformedSource(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::SourceMissing(path) => write!(f, "{} does not exist", path),
            CollectError::MalformedSource(msg) => write!(f, "malformed source: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Reads CPU counters from `<proc_path>/stat`.
pub struct StatReader<F: FileSystem> {
    fs: F,
    stat_path: PathBuf,
}

impl<F: FileSystem> StatReader<F> {
    /// Creates a new reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            stat_path: proc_path.as_ref().join("stat"),
        }
    }

    pub fn stat_path(&self) -> &Path {
        &self.stat_path
    }

    /// Returns whether the counter source exists.
    pub fn is_available(&self) -> bool {
        self.fs.exists(&self.stat_path)
    }

    /// Reads the source once and parses every CPU line.
    ///
    /// Fails without a partial result if any CPU line is malformed.
    pub fn read_snapshot(&self) -> Result<Snapshot, CollectError> {
        let content = self.fs.read_to_string(&self.stat_path)?;
        let snapshot =
            parse_cpu_stat(&content).map_err(|e| CollectError::MalformedSource(e.message))?;
        trace!(cpus = snapshot.len(), path = ?self.stat_path, "read cpu counters");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, scenarios};
    use crate::model::{Category, CpuId};

    #[test]
    fn test_read_snapshot() {
        let reader = StatReader::new(MockFs::two_core_system(), "/proc");
        let snapshot = reader.read_snapshot().unwrap();

        assert_eq!(snapshot.len(), 3);
        let cpu0 = snapshot.get(CpuId::Core(0)).unwrap();
        assert_eq!(cpu0.get(Category::User), 3464284);
    }

    #[test]
    fn test_read_snapshot_custom_proc_path() {
        let fs = MockFs::new();
        fs.add_file("/host/proc/stat", scenarios::QUAD_CORE);
        let reader = StatReader::new(fs, "/host/proc");

        assert_eq!(reader.stat_path(), Path::new("/host/proc/stat"));
        assert!(reader.is_available());
        assert_eq!(reader.read_snapshot().unwrap().len(), 5);
    }

    #[test]
    fn test_read_snapshot_malformed() {
        for content in [scenarios::TRUNCATED, scenarios::GARBLED, ""] {
            let reader = StatReader::new(MockFs::with_stat(content), "/proc");
            let err = reader.read_snapshot().unwrap_err();
            assert!(matches!(err, CollectError::MalformedSource(_)), "{}", err);
        }
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        let reader = StatReader::new(MockFs::new(), "/proc");
        assert!(!reader.is_available());
        assert!(matches!(
            reader.read_snapshot().unwrap_err(),
            CollectError::Io(_)
        ));
    }
}
