use std::path::Path;

use super::{FileNamer, NamerError, Partition};

/// Reject names that would break the candidate-path conventions: empty
/// names, names containing a path separator, and dot-prefixed names (the
/// hidden-name prefix belongs to the staging strategy, not the namer).
fn validate_file_name(name: &str) -> Result<(), NamerError> {
    if name.is_empty() {
        return Err(NamerError::new("generated file name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(NamerError::new(format!(
            "generated file name contains a path separator: {name:?}"
        )));
    }
    if name.starts_with('.') {
        return Err(NamerError::new(format!(
            "generated file name starts with a dot: {name:?}"
        )));
    }
    Ok(())
}

/// Namer that always yields the same configured file name.
///
/// Suitable when the partition is already encoded in the directory layout
/// and each directory holds a single output file.
#[derive(Debug, Clone)]
pub struct ConstantFileNamer {
    name: String,
}

impl ConstantFileNamer {
    /// Create a namer that always yields `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FileNamer for ConstantFileNamer {
    fn generate(&self, _dir: &Path, _partition: Option<&Partition>) -> Result<String, NamerError> {
        validate_file_name(&self.name)?;
        Ok(self.name.clone())
    }
}

/// Namer that derives `prefix[-col=value]*.extension` from the partition.
///
/// Without a partition this collapses to `prefix.extension`.
#[derive(Debug, Clone)]
pub struct PartitionedFileNamer {
    prefix: String,
    extension: String,
}

impl PartitionedFileNamer {
    /// Create a namer with the given file-name prefix and extension.
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }
}

impl FileNamer for PartitionedFileNamer {
    fn generate(&self, _dir: &Path, partition: Option<&Partition>) -> Result<String, NamerError> {
        let mut stem = self.prefix.clone();
        if let Some(partition) = partition {
            for part in partition.parts() {
                stem.push('-');
                stem.push_str(&part.column);
                stem.push('=');
                stem.push_str(&part.value);
            }
        }

        let name = format!("{stem}.{}", self.extension);
        validate_file_name(&name)?;
        Ok(name)
    }
}
