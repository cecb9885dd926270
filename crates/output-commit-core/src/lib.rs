//! Core engine for a crash-safe output commit protocol.
//!
//! This crate provides the file lifecycle used by batch writers producing
//! output on a shared (often remote) filesystem:
//!
//! - A [`manager::FileManager`] that allocates a candidate path for an
//!   in-progress write (`prepare`) and later makes the completed file
//!   durably visible at its final path (`commit`).
//! - Two commit strategies behind one uniform surface
//!   ([`manager::CommitStrategy`]): **staging**, which hides candidates
//!   under a dot-prefixed name until an atomic rename reveals them, and
//!   **optimistic**, which writes straight to the final path.
//! - A [`storage::FilesystemGateway`] capability passed explicitly into
//!   every operation, with a local backend and an in-memory backend so the
//!   protocol can be exercised without touching disk.
//! - A [`naming::FileNamer`] seam that derives file names from an output
//!   directory and an optional partition.
//!
//! No data flows through the protocol itself: the external writer streams
//! bytes into the candidate path, and the manager only manipulates path
//! identity and existence. The directory structure is the only persisted
//! state — a dot-prefixed file is an in-flight or abandoned write, and the
//! next `prepare` for the same target cleans it up.
//!
//! Higher-level orchestration (which partitions to write, retry policy,
//! parallelism across writers) is expected to live above this crate.
#![deny(missing_docs)]
pub mod manager;
pub mod naming;
pub mod storage;
