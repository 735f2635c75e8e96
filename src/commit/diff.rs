//! Staged diff collection using git2.

use git2::{DiffDelta, DiffFormat, ErrorCode, Repository, Tree};

use crate::error::CommitError;

/// Unified patch text for one staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub patch: String,
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(CommitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, CommitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(CommitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(CommitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the staged changes (HEAD tree to index) as one patch per file.
///
/// Files appear in git's diff order. Returns `CommitError::NoChanges` when
/// nothing is staged.
pub fn collect_staged_diff(repo: &Repository) -> Result<Vec<FileDiff>, CommitError> {
    let head_tree = resolve_head_tree(repo)?;
    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(CommitError::DiffFailed)?;

    let mut files: Vec<FileDiff> = Vec::new();
    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let path = delta_path(&delta);
        if files.last().is_none_or(|f| f.path != path) {
            files.push(FileDiff {
                path,
                patch: String::new(),
            });
        }

        if let Some(entry) = files.last_mut() {
            let origin = line.origin();
            if origin == '+' || origin == '-' || origin == ' ' {
                entry.patch.push(origin);
            }
            entry.patch.push_str(&String::from_utf8_lossy(line.content()));
        }
        true
    })
    .map_err(CommitError::DiffFailed)?;

    if files.is_empty() {
        return Err(CommitError::NoChanges);
    }

    Ok(files)
}

fn delta_path(delta: &DiffDelta<'_>) -> String {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}
