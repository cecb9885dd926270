//! Wrapper prelude.
//!
//! The `output-commit` crate is the supported public entry point. Downstream
//! code should prefer importing from this prelude instead of depending on
//! internal core module paths.

pub use crate::{
    CandidatePath, CommitError, CommitStrategy, ConstantFileNamer, FileManager, FileNamer,
    FilesystemGateway, FinalPath, MemoryGateway, NamerError, Partition, PartitionPart,
    PartitionedFileNamer, StorageError,
};
