//! Filesystem gateway backing the commit protocol.
//!
//! This module centralizes every filesystem interaction the protocol
//! performs, behind a small capability surface:
//!
//! - `delete` with explicit "already absent is success" semantics, used by
//!   `prepare` to clear stale candidates idempotently.
//! - `rename`, atomic within one directory on the local backend, which is
//!   what the staging strategy's visibility guarantee rests on.
//! - `write` / `read` / `exists` conveniences so tests and small callers can
//!   play the external-writer role without a second I/O stack.
//!
//! The gateway is an explicit value passed into every operation — there is
//! no ambient filesystem singleton — so tests can substitute the in-memory
//! backend and assert exactly which calls a code path performed.
//!
//! Backends are a closed set: new ones (object stores, remote filesystems)
//! are added as variants without changing callers. All operations are
//! `async` because on remote backends each of them is a network round-trip;
//! callers should expect latency accordingly.

use std::io;
use std::path::Path;

use snafu::ResultExt;
use tokio::{fs, io::AsyncWriteExt};

mod error;
mod memory;

pub use error::{BackendError, StorageError};
pub use memory::{GatewayStats, MemoryGateway};

pub(crate) use error::{NotFoundSnafu, OtherIoSnafu};

/// General result type used by gateway operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Capability surface over the filesystem that holds the output files.
///
/// `Local` operates on real paths through `tokio::fs`. `Memory` keeps files
/// in a path-keyed map and counts every call, which tests use to verify
/// which operations a strategy performed.
#[derive(Debug)]
pub enum FilesystemGateway {
    /// Local filesystem, paths used as given.
    Local,
    /// In-memory file map, primarily for tests and embedded callers.
    Memory(MemoryGateway),
}

impl FilesystemGateway {
    /// Gateway over the local filesystem.
    pub fn local() -> Self {
        FilesystemGateway::Local
    }

    /// Gateway over a fresh in-memory file map.
    pub fn memory() -> Self {
        FilesystemGateway::Memory(MemoryGateway::new())
    }

    /// Remove the file or directory at `path`.
    ///
    /// Returns `Ok(true)` when something was removed and `Ok(false)` when
    /// the path was already absent. Deleting an absent path is a successful
    /// no-op, never an error; `Err` is reserved for genuine failures such as
    /// permission problems, so callers can tell "already clean" apart from
    /// "could not clean". `recursive` must be set to remove a non-empty
    /// directory.
    pub async fn delete(&self, path: &Path, recursive: bool) -> StorageResult<bool> {
        match self {
            FilesystemGateway::Local => delete_local(path, recursive).await,
            FilesystemGateway::Memory(mem) => mem.delete(path, recursive),
        }
    }

    /// Rename `from` to `to`.
    ///
    /// On the local backend this is a plain filesystem rename: atomic with
    /// respect to directory listings when both paths share a volume, and an
    /// existing `to` is replaced. A missing source surfaces as
    /// [`StorageError::NotFound`].
    pub async fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        match self {
            FilesystemGateway::Local => rename_local(from, to).await,
            FilesystemGateway::Memory(mem) => mem.rename(from, to),
        }
    }

    /// Write `contents` to `path`, creating parent directories as needed and
    /// syncing the file before returning. An existing file is replaced.
    pub async fn write(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        match self {
            FilesystemGateway::Local => write_local(path, contents).await,
            FilesystemGateway::Memory(mem) => mem.write(path, contents),
        }
    }

    /// Read the full contents of the file at `path`.
    pub async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        match self {
            FilesystemGateway::Local => read_local(path).await,
            FilesystemGateway::Memory(mem) => mem.read(path),
        }
    }

    /// Whether anything exists at `path`.
    pub async fn exists(&self, path: &Path) -> StorageResult<bool> {
        match self {
            FilesystemGateway::Local => exists_local(path).await,
            FilesystemGateway::Memory(mem) => Ok(mem.exists(path)),
        }
    }
}

async fn delete_local(path: &Path, recursive: bool) -> StorageResult<bool> {
    let meta = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(BackendError::Local(e)).context(OtherIoSnafu {
                path: path.display().to_string(),
            });
        }
    };

    let removal = if meta.is_dir() {
        if recursive {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_dir(path).await
        }
    } else {
        fs::remove_file(path).await
    };

    match removal {
        Ok(()) => Ok(true),
        // Lost a race with another deleter; the path is gone either way.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu {
            path: path.display().to_string(),
        }),
    }
}

async fn rename_local(from: &Path, to: &Path) -> StorageResult<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BackendError::Local(e)).context(NotFoundSnafu {
                path: from.display().to_string(),
            })
        }
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu {
            path: to.display().to_string(),
        }),
    }
}

async fn write_local(path: &Path, contents: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(BackendError::Local)
            .context(OtherIoSnafu {
                path: parent.display().to_string(),
            })?;
    }

    let mut file = fs::File::create(path)
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: path.display().to_string(),
        })?;

    file.write_all(contents)
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: path.display().to_string(),
        })?;

    file.sync_all()
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: path.display().to_string(),
        })?;

    Ok(())
}

async fn read_local(path: &Path) -> StorageResult<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BackendError::Local(e)).context(NotFoundSnafu {
                path: path.display().to_string(),
            })
        }
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu {
            path: path.display().to_string(),
        }),
    }
}

async fn exists_local(path: &Path) -> StorageResult<bool> {
    match fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu {
            path: path.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn delete_absent_path_is_a_noop() -> TestResult {
        let tmp = TempDir::new()?;
        let fs = FilesystemGateway::local();

        let removed = fs.delete(&tmp.path().join("missing"), false).await?;
        assert!(!removed);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_existing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let fs = FilesystemGateway::local();
        let path = tmp.path().join("stale");
        fs.write(&path, b"stale bytes").await?;

        let removed = fs.delete(&path, false).await?;
        assert!(removed);
        assert!(!fs.exists(&path).await?);
        Ok(())
    }

    #[tokio::test]
    async fn write_then_read_round_trips() -> TestResult {
        let tmp = TempDir::new()?;
        let fs = FilesystemGateway::local();
        let path = tmp.path().join("nested").join("out.bin");

        fs.write(&path, b"payload").await?;
        assert_eq!(fs.read(&path).await?, b"payload");
        Ok(())
    }

    #[tokio::test]
    async fn rename_missing_source_is_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let fs = FilesystemGateway::local();

        let err = fs
            .rename(&tmp.path().join("gone"), &tmp.path().join("dst"))
            .await
            .expect_err("expected NotFound");
        assert!(matches!(err, StorageError::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn rename_moves_contents() -> TestResult {
        let tmp = TempDir::new()?;
        let fs = FilesystemGateway::local();
        let src = tmp.path().join(".hidden");
        let dst = tmp.path().join("visible");
        fs.write(&src, b"done").await?;

        fs.rename(&src, &dst).await?;
        assert!(!fs.exists(&src).await?);
        assert_eq!(fs.read(&dst).await?, b"done");
        Ok(())
    }
}
