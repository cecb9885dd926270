//! Partitions and the file-naming seam of the commit protocol.
//!
//! The commit core never invents file names itself: a [`FileNamer`] derives
//! them from the output directory and an optional [`Partition`]. The
//! partition is opaque to the core beyond being handed to the namer — the
//! naming *algorithm* belongs to the caller, this module only fixes the
//! contract it must satisfy and ships two simple implementations
//! ([`ConstantFileNamer`], [`PartitionedFileNamer`]).

use std::fmt;
use std::path::Path;

use snafu::{Backtrace, prelude::*};

mod namers;

pub use namers::{ConstantFileNamer, PartitionedFileNamer};

/// One `column=value` component of a [`Partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPart {
    /// Column the partition value was derived from.
    pub column: String,
    /// Value of the column for this partition.
    pub value: String,
}

impl PartitionPart {
    /// Create a part from a column name and its value.
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Ordered sequence of `column=value` pairs identifying one output
/// partition.
///
/// Only used to derive file names; the commit core attaches no further
/// meaning to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition(Vec<PartitionPart>);

impl Partition {
    /// Create a partition from its ordered parts.
    pub fn new(parts: Vec<PartitionPart>) -> Self {
        Partition(parts)
    }

    /// The ordered `column=value` parts.
    pub fn parts(&self) -> &[PartitionPart] {
        &self.0
    }

    /// Whether the partition carries no parts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque failure raised by a [`FileNamer`].
///
/// The commit core propagates namer failures to the caller without
/// interpreting them.
#[derive(Debug, Snafu)]
#[snafu(display("file name generation failed: {message}"))]
pub struct NamerError {
    message: String,
    backtrace: Backtrace,
}

impl NamerError {
    /// Create a namer error from a human-readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        NamerSnafu {
            message: message.into(),
        }
        .build()
    }
}

/// Derives the file name for an output from its directory and partition.
///
/// Implementations must be pure and deterministic for identical inputs: the
/// delete-then-recreate idempotency of `prepare` is only meaningful when a
/// retry resolves to the same name. Generated names must be bare file names
/// (no path separators) and must not start with a dot, which the staging
/// strategy reserves for hiding candidates.
pub trait FileNamer: fmt::Debug + Send + Sync {
    /// Produce the file name for the output under `dir` for `partition`.
    fn generate(&self, dir: &Path, partition: Option<&Partition>) -> Result<String, NamerError>;
}
