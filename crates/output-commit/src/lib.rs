//! # output-commit
//!
//! Two-phase file commit protocol for batch writers on a shared filesystem.
//!
//! This crate is the supported public entry point and provides a small,
//! stable surface over `output-commit-core`: prepare a candidate path,
//! stream bytes into it, commit it to its final visible path.
//!
//! ## Example
//!
//! ```rust,ignore
//! use output_commit::prelude::*;
//!
//! let fs = FilesystemGateway::local();
//! let manager = FileManager::staging(Box::new(ConstantFileNamer::new("part-0001.parquet")));
//! let candidate = manager.prepare(dir, None, &fs).await?;
//! // ... external writer streams bytes into candidate.as_path() ...
//! let final_path = manager.commit(candidate, &fs).await?;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

pub use output_commit_core::manager::{
    CandidatePath, CommitError, CommitStrategy, FileManager, FinalPath, HIDDEN_PREFIX,
};
pub use output_commit_core::naming::{
    ConstantFileNamer, FileNamer, NamerError, Partition, PartitionPart, PartitionedFileNamer,
};
pub use output_commit_core::storage::{
    BackendError, FilesystemGateway, GatewayStats, MemoryGateway, StorageError, StorageResult,
};
