//! Hidden-name staging: candidates live under a dot-prefixed file name so
//! readers scanning the directory never observe an in-progress write, and
//! commit reveals them with a same-directory rename.

use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt};

use super::error::{InvalidCandidateSnafu, RenameSnafu};
use super::{CandidatePath, CommitError, FinalPath};
use crate::storage::FilesystemGateway;

/// Prefix that hides an in-progress candidate from directory scans.
pub const HIDDEN_PREFIX: char = '.';

/// Hidden candidate path for `file_name` under `dir`.
pub(crate) fn candidate_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!("{HIDDEN_PREFIX}{file_name}"))
}

/// Visible path for a hidden candidate: same parent directory, one leading
/// dot stripped from the file name. `None` when the file name is not
/// dot-prefixed, not valid UTF-8, or nothing but the dot.
pub(crate) fn reveal_path(candidate: &Path) -> Option<PathBuf> {
    let name = candidate.file_name()?.to_str()?;
    let visible = name.strip_prefix(HIDDEN_PREFIX)?;
    if visible.is_empty() {
        return None;
    }
    Some(candidate.with_file_name(visible))
}

pub(crate) async fn commit(
    candidate: CandidatePath,
    fs: &FilesystemGateway,
) -> Result<FinalPath, CommitError> {
    let from = candidate.into_path_buf();
    let to = reveal_path(&from).context(InvalidCandidateSnafu {
        path: from.display().to_string(),
    })?;

    fs.rename(&from, &to).await.context(RenameSnafu {
        from: from.display().to_string(),
        to: to.display().to_string(),
    })?;

    Ok(FinalPath(to))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn candidate_path_prefixes_a_dot() {
        let path = candidate_path(Path::new("/out"), "part-0001.parquet");
        assert_eq!(path, Path::new("/out/.part-0001.parquet"));
    }

    #[test]
    fn reveal_strips_exactly_one_dot() {
        let revealed = reveal_path(Path::new("/out/.part-0001.parquet")).unwrap();
        assert_eq!(revealed, Path::new("/out/part-0001.parquet"));

        // A doubly hidden name stays hidden once revealed.
        let revealed = reveal_path(Path::new("/out/..twice")).unwrap();
        assert_eq!(revealed, Path::new("/out/.twice"));
    }

    #[test]
    fn reveal_rejects_non_hidden_names() {
        assert!(reveal_path(Path::new("/out/part-0001.parquet")).is_none());
        assert!(reveal_path(Path::new("/")).is_none());
    }
}
