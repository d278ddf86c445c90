//! Staging and commit creation.

use git2::{ErrorCode, IndexAddOption, Oid, Repository};
use tracing::info;

use crate::error::GitError;

/// Stage every pending change and commit it with `message`.
///
/// Handles the unborn-HEAD case: the first commit in a fresh repo gets no
/// parents. The author signature comes from the repo's git config;
/// a missing user.name/user.email surfaces as [`GitError::ConfigError`].
pub fn stage_and_commit(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::StagingFailed)?;
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .map_err(GitError::StagingFailed)?;
    index.write().map_err(GitError::StagingFailed)?;

    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            None
        }
        Err(e) => return Err(GitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    info!(commit = %oid, "created commit");
    Ok(oid)
}
