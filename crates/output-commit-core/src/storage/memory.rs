use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use snafu::ResultExt;

use super::StorageResult;
use super::error::{BackendError, NotFoundSnafu};

/// Snapshot of how many times each gateway operation has been invoked.
///
/// Returned by [`MemoryGateway::stats`]; tests use it to assert that a code
/// path performed (or, for the optimistic commit, did not perform) a given
/// filesystem call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    /// Number of `delete` calls observed, including no-op deletions.
    pub deletes: u64,
    /// Number of `rename` calls observed, including failed ones.
    pub renames: u64,
    /// Number of `write` calls observed.
    pub writes: u64,
    /// Number of `read` calls observed.
    pub reads: u64,
}

/// An in-memory filesystem backend, intended primarily for testing.
///
/// Files live in a path-keyed map; there are no real directories, so any
/// path is writable and a "directory" exists exactly as far as its files do.
/// Interior mutability lets the gateway be shared by `&` reference like the
/// local backend is.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    deletes: AtomicU64,
    renames: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
}

impl MemoryGateway {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of the call counters.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            deletes: self.deletes.load(Ordering::SeqCst),
            renames: self.renames.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
            reads: self.reads.load(Ordering::SeqCst),
        }
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn delete(&self, path: &Path, recursive: bool) -> StorageResult<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut files = self.files();

        if files.remove(path).is_some() {
            return Ok(true);
        }

        if recursive {
            let children: Vec<PathBuf> = files
                .keys()
                .filter(|k| k.starts_with(path))
                .cloned()
                .collect();
            if !children.is_empty() {
                for child in &children {
                    files.remove(child);
                }
                return Ok(true);
            }
        }

        Ok(false)
    }

    pub(crate) fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        let mut files = self.files();

        match files.remove(from) {
            Some(bytes) => {
                files.insert(to.to_path_buf(), bytes);
                Ok(())
            }
            None => Err(BackendError::Memory(io::Error::new(
                io::ErrorKind::NotFound,
                "rename source missing",
            )))
            .context(NotFoundSnafu {
                path: from.display().to_string(),
            }),
        }
    }

    pub(crate) fn write(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    pub(crate) fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.files().get(path) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(BackendError::Memory(io::Error::new(
                io::ErrorKind::NotFound,
                "no such file",
            )))
            .context(NotFoundSnafu {
                path: path.display().to_string(),
            }),
        }
    }

    pub(crate) fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn file_round_trip() {
        let mem = MemoryGateway::new();
        let path = Path::new("/out/part-0001.parquet");

        assert!(!mem.exists(path));
        mem.write(path, b"hello").unwrap();
        assert!(mem.exists(path));
        assert_eq!(mem.read(path).unwrap(), b"hello");
    }

    #[test]
    fn delete_absent_returns_false_but_counts() {
        let mem = MemoryGateway::new();

        let removed = mem.delete(Path::new("/out/missing"), false).unwrap();
        assert!(!removed);
        assert_eq!(mem.stats().deletes, 1);
    }

    #[test]
    fn recursive_delete_removes_children() {
        let mem = MemoryGateway::new();
        mem.write(Path::new("/out/a"), b"a").unwrap();
        mem.write(Path::new("/out/b"), b"b").unwrap();

        let removed = mem.delete(Path::new("/out"), true).unwrap();
        assert!(removed);
        assert!(!mem.exists(Path::new("/out/a")));
        assert!(!mem.exists(Path::new("/out/b")));
    }

    #[test]
    fn rename_missing_source_is_not_found() {
        let mem = MemoryGateway::new();

        let err = mem
            .rename(Path::new("/out/.gone"), Path::new("/out/gone"))
            .expect_err("expected NotFound");
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert_eq!(mem.stats().renames, 1);
    }

    #[test]
    fn rename_replaces_existing_target() {
        let mem = MemoryGateway::new();
        mem.write(Path::new("/out/.part"), b"new").unwrap();
        mem.write(Path::new("/out/part"), b"old").unwrap();

        mem.rename(Path::new("/out/.part"), Path::new("/out/part"))
            .unwrap();
        assert_eq!(mem.read(Path::new("/out/part")).unwrap(), b"new");
        assert!(!mem.exists(Path::new("/out/.part")));
    }
}
