//! Working tree diff collection using git2.

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::warn;

use crate::error::GitError;

/// Maximum characters of unified diff text before truncation. The
/// classifier and the prompt both work on bounded excerpts anyway.
const MAX_DIFF_LENGTH: usize = 30_000;

/// Everything classification needs about the pending changes.
#[derive(Debug, Clone)]
pub struct WorkingTreeChanges {
    pub diff_text: String,
    /// Tracked files with staged or unstaged modifications, sorted.
    pub staged_paths: Vec<String>,
    /// Files git has never seen, sorted.
    pub untracked_paths: Vec<String>,
    pub truncated: bool,
    pub additions: usize,
    pub deletions: usize,
}

/// Resolve the HEAD tree, distinguishing empty-repo conditions from real
/// failures.
///
/// Returns `Ok(None)` for repos with no commits yet (unborn branch / not
/// found) and `Err` for genuine problems such as a corrupt HEAD.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect every pending change: staged, unstaged and untracked.
///
/// Merges `diff_tree_to_index` with `diff_index_to_workdir` so one call
/// captures the whole working tree state. Errors with
/// [`GitError::NoChanges`] when the tree is clean.
pub fn collect_changes(repo: &Repository) -> Result<WorkingTreeChanges, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let staged_diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let workdir_diff = repo
        .diff_index_to_workdir(None, Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let mut staged_paths = Vec::new();
    let mut untracked_paths = Vec::new();
    split_paths(&staged_diff, &mut staged_paths, &mut untracked_paths);
    split_paths(&workdir_diff, &mut staged_paths, &mut untracked_paths);

    staged_paths.sort();
    staged_paths.dedup();
    untracked_paths.sort();
    untracked_paths.dedup();
    // A path staged in one diff and untracked in the other counts as
    // staged.
    untracked_paths.retain(|p| !staged_paths.contains(p));

    if staged_paths.is_empty() && untracked_paths.is_empty() {
        return Err(GitError::NoChanges);
    }

    let mut diff_text = String::new();
    let mut additions = 0usize;
    let mut deletions = 0usize;
    let mut truncated = false;

    append_diff_text(&staged_diff, &mut diff_text, &mut additions, &mut deletions, &mut truncated);
    if !truncated {
        append_diff_text(
            &workdir_diff,
            &mut diff_text,
            &mut additions,
            &mut deletions,
            &mut truncated,
        );
    }

    Ok(WorkingTreeChanges {
        diff_text,
        staged_paths,
        untracked_paths,
        truncated,
        additions,
        deletions,
    })
}

/// Sort each delta's path into the staged or untracked bucket.
fn split_paths(diff: &Diff<'_>, staged: &mut Vec<String>, untracked: &mut Vec<String>) {
    for delta in diff.deltas() {
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().to_string());

        let Some(path) = path else { continue };
        if path.is_empty() {
            continue;
        }

        match delta.status() {
            Delta::Untracked | Delta::Added => untracked.push(path),
            _ => staged.push(path),
        }
    }
}

/// Append unified diff text from one diff object, respecting the length
/// cap.
fn append_diff_text(
    diff: &Diff<'_>,
    text: &mut String,
    additions: &mut usize,
    deletions: &mut usize,
    truncated: &mut bool,
) {
    if *truncated {
        return;
    }

    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if *truncated {
            return true;
        }

        match line.origin() {
            '+' => *additions += 1,
            '-' => *deletions += 1,
            _ => {}
        }

        let content = std::str::from_utf8(line.content()).unwrap_or("");

        if text.len() + content.len() + 2 > MAX_DIFF_LENGTH {
            *truncated = true;
            return true;
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(content);

        true
    }) {
        warn!("failed to collect diff text: {e}");
        *truncated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo_with_commit(dir: &std::path::Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        repo
    }

    #[test]
    fn test_clean_repo_reports_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path());
        assert!(matches!(collect_changes(&repo), Err(GitError::NoChanges)));
    }

    #[test]
    fn test_new_file_lands_in_untracked() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path());
        std::fs::write(dir.path().join("new.txt"), "hello world\n").unwrap();

        let changes = collect_changes(&repo).unwrap();
        assert_eq!(changes.untracked_paths, vec!["new.txt".to_string()]);
        assert!(changes.staged_paths.is_empty());
        assert!(changes.diff_text.contains("hello world"));
    }

    #[test]
    fn test_staged_modification_lands_in_staged() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let file_path = dir.path().join("file.txt");
        std::fs::write(&file_path, "original\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("file.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();

        std::fs::write(&file_path, "modified\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("file.txt")).unwrap();
        index.write().unwrap();

        let changes = collect_changes(&repo).unwrap();
        assert_eq!(changes.staged_paths, vec!["file.txt".to_string()]);
        assert!(changes.diff_text.contains("modified"));
        assert!(changes.additions >= 1);
        assert!(changes.deletions >= 1);
    }

    #[test]
    fn test_unborn_head_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("first.txt"), "hello\n").unwrap();

        let changes = collect_changes(&repo).unwrap();
        assert!(changes.untracked_paths.contains(&"first.txt".to_string()));
    }

    #[test]
    fn test_corrupt_head_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/\0invalid").unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        assert!(matches!(collect_changes(&repo), Err(GitError::DiffFailed(_))));
    }

    #[test]
    fn test_paths_are_sorted_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path());
        std::fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();

        let changes = collect_changes(&repo).unwrap();
        assert_eq!(
            changes.untracked_paths,
            vec!["a.txt".to_string(), "b.txt".to_string()]
        );
    }
}
