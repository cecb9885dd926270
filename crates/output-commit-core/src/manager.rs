//! Two-phase prepare/commit lifecycle for output files.
//!
//! This module owns the protocol itself:
//!
//! - [`FileManager::prepare`] allocates a [`CandidatePath`] for one logical
//!   write, clearing any stale candidate a crashed or abandoned attempt left
//!   behind.
//! - The external writer streams bytes into the candidate through the
//!   gateway; no data ever flows through the manager.
//! - [`FileManager::commit`] turns the candidate into a [`FinalPath`],
//!   making the completed file durably visible.
//!
//! Strategies form a closed set ([`CommitStrategy`]) dispatched behind the
//! uniform `prepare`/`commit` surface, so callers never branch on which one
//! is in play and new strategies (a journaled commit, a manifest-based
//! multi-file commit) are added as variants without touching call sites.
//!
//! Ordering and sharing are caller contracts: `prepare` must complete before
//! `commit` runs on the returned candidate, and no two writers may target
//! the same (directory, partition) pair at once — the manager takes no locks
//! over that namespace. What the protocol does guarantee is self-healing
//! across restarts: an abandoned candidate is deleted by the next `prepare`
//! for the same target.

use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::naming::{FileNamer, Partition};
use crate::storage::FilesystemGateway;

mod error;
mod staging;

pub use error::CommitError;
pub use staging::HIDDEN_PREFIX;

use error::{DeleteSnafu, NamingSnafu};

/// Path allocated by [`FileManager::prepare`] for an in-progress write.
///
/// A candidate is owned by exactly one logical write; nothing else may touch
/// it between `prepare` and `commit`. Cloning is allowed so a caller can
/// retain a copy for a commit retry — `commit` consumes the value it is
/// given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath(PathBuf);

impl CandidatePath {
    /// Re-wrap a previously issued candidate path, for example one
    /// rediscovered by scanning for hidden files after a crash.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CandidatePath(path.into())
    }

    /// The path the external writer should stream bytes into.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Unwrap into the underlying path.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Durably visible output path produced by [`FileManager::commit`].
///
/// Once returned, the protocol holds no further reference to the file;
/// ownership passes entirely to the caller and downstream readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalPath(PathBuf);

impl FinalPath {
    /// The visible output path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Unwrap into the underlying path.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// How prepared files become visible at their final path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
    /// Write under a dot-prefixed hidden name and rename to the visible
    /// name on commit. Readers scanning the directory either see nothing or
    /// the complete file, contingent on the gateway's rename being atomic
    /// within one directory.
    Staging,
    /// Write directly to the final path; commit is an identity operation.
    ///
    /// Accepted risk: between `prepare` and the writer finishing, the path
    /// is visible and may hold zero bytes or a partial write if a reader
    /// races the writer or the process crashes mid-write. Chosen when the
    /// rename round-trip is too expensive, or when the writer buffers fully
    /// before any bytes reach the filesystem.
    Optimistic,
}

/// Prepares and commits output files through a fixed [`CommitStrategy`].
///
/// Usage: `prepare` yields a [`CandidatePath`], the caller streams bytes
/// into it through the gateway, and `commit` turns it into a [`FinalPath`].
/// The gateway is passed explicitly into both calls so tests can substitute
/// the in-memory backend.
#[derive(Debug)]
pub struct FileManager {
    strategy: CommitStrategy,
    namer: Box<dyn FileNamer>,
}

impl FileManager {
    /// Create a manager committing through `strategy`, naming files with
    /// `namer`.
    pub fn new(strategy: CommitStrategy, namer: Box<dyn FileNamer>) -> Self {
        Self { strategy, namer }
    }

    /// Manager using the hidden-name staging strategy.
    pub fn staging(namer: Box<dyn FileNamer>) -> Self {
        Self::new(CommitStrategy::Staging, namer)
    }

    /// Manager using the direct optimistic strategy.
    pub fn optimistic(namer: Box<dyn FileNamer>) -> Self {
        Self::new(CommitStrategy::Optimistic, namer)
    }

    /// Strategy this manager commits through.
    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    /// Allocate the candidate path for one output under `dir`.
    ///
    /// The namer derives the file name from `(dir, partition)`; staging
    /// managers hide it behind [`HIDDEN_PREFIX`], optimistic managers use it
    /// as is. Any stale file at the candidate path — left by a crashed or
    /// abandoned earlier attempt — is deleted first, so the returned path
    /// never pre-exists with stale content. Because the namer is
    /// deterministic, a retried `prepare` resolves to the same candidate
    /// path and repeats that cleanup.
    ///
    /// # Errors
    ///
    /// [`CommitError::Naming`] when the namer rejects the input, and
    /// [`CommitError::Delete`] when clearing the stale candidate fails for
    /// any reason other than the path being absent (absence is a successful
    /// no-op). A failed `prepare` leaves the output directory unchanged.
    pub async fn prepare(
        &self,
        dir: &Path,
        partition: Option<&Partition>,
        fs: &FilesystemGateway,
    ) -> Result<CandidatePath, CommitError> {
        let file_name = self.namer.generate(dir, partition).context(NamingSnafu)?;

        let path = match self.strategy {
            CommitStrategy::Staging => staging::candidate_path(dir, &file_name),
            CommitStrategy::Optimistic => dir.join(&file_name),
        };

        clear_stale_candidate(&path, fs).await?;
        Ok(CandidatePath(path))
    }

    /// Make a completed candidate durably visible and return its final
    /// path.
    ///
    /// Staging managers strip the leading dot from the file name and rename
    /// the candidate within its directory. Optimistic managers return the
    /// candidate path unchanged and perform no gateway call at all — the
    /// method exists on both so callers never branch on strategy.
    ///
    /// # Errors
    ///
    /// [`CommitError::Rename`] when the staging rename fails (source
    /// vanished, permission denied, rename unsupported). The candidate is
    /// left untouched under its hidden name, so retrying `commit` or
    /// discarding it via a fresh `prepare` are both safe. Note the flip side
    /// of retry safety: a `commit` retried after a successful rename fails
    /// with [`CommitError::Rename`] because the source is gone — it never
    /// silently succeeds. [`CommitError::InvalidCandidate`] when a staging
    /// candidate's file name is not dot-prefixed, which cannot happen for
    /// candidates issued by [`FileManager::prepare`].
    pub async fn commit(
        &self,
        candidate: CandidatePath,
        fs: &FilesystemGateway,
    ) -> Result<FinalPath, CommitError> {
        match self.strategy {
            CommitStrategy::Staging => staging::commit(candidate, fs).await,
            CommitStrategy::Optimistic => Ok(FinalPath(candidate.into_path_buf())),
        }
    }
}

/// Delete whatever sits at `path`, tolerating absence.
async fn clear_stale_candidate(path: &Path, fs: &FilesystemGateway) -> Result<(), CommitError> {
    let removed = fs.delete(path, false).await.context(DeleteSnafu {
        path: path.display().to_string(),
    })?;

    if removed {
        log::warn!(
            "removed stale candidate left by an earlier attempt: {}",
            path.display()
        );
    }

    Ok(())
}
