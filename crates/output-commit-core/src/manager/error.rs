use snafu::{Backtrace, prelude::*};

use crate::naming::NamerError;
use crate::storage::StorageError;

/// Errors raised by the prepare/commit lifecycle.
///
/// Nothing here is silently recovered from: every gateway failure is
/// surfaced to the caller unchanged, and retries are an orchestration-layer
/// concern. The one built-in tolerance — deleting an absent path during
/// `prepare` — never reaches this type, because the gateway reports it as a
/// successful no-op.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommitError {
    /// Clearing a stale candidate failed for a reason other than the path
    /// being absent. Fatal to `prepare`; the output directory is unchanged.
    #[snafu(display("failed to clear stale candidate at {path}"))]
    Delete {
        /// Candidate path the deletion targeted.
        path: String,
        /// Underlying gateway failure.
        source: StorageError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Renaming the candidate to its final path failed. Fatal to `commit`;
    /// the candidate is left untouched under its hidden name, so retrying
    /// `commit` or discarding via a fresh `prepare` are both safe.
    #[snafu(display("failed to rename candidate {from} to {to}"))]
    Rename {
        /// Hidden candidate path the rename read from.
        from: String,
        /// Visible path the rename targeted.
        to: String,
        /// Underlying gateway failure.
        source: StorageError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The namer rejected the (directory, partition) input. Propagated
    /// opaquely; the commit core does not interpret namer failures.
    #[snafu(display("file name generation failed"))]
    Naming {
        /// The namer's failure, uninterpreted.
        source: NamerError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A staging commit was handed a candidate whose file name is not
    /// dot-prefixed. Candidates issued by `prepare` always are; this guards
    /// hand-rewrapped paths.
    #[snafu(display("not a staging candidate: {path}"))]
    InvalidCandidate {
        /// The offending candidate path.
        path: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}
