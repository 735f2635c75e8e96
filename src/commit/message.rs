//! Creating a commit from the staged index.

use git2::{ErrorCode, Oid, Repository};

use crate::error::CommitError;

/// Commit whatever is currently staged on HEAD with the given message.
///
/// Creates a root commit when HEAD is unborn. The signature comes from git
/// config (`user.name` / `user.email`).
pub fn commit_staged(repo: &Repository, message: &str) -> Result<Oid, CommitError> {
    let mut index = repo.index().map_err(CommitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(CommitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let sig = repo.signature().map_err(CommitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(CommitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(CommitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(CommitError::CommitFailed)
}
