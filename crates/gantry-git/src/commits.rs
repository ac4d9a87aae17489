//! Commit history operations

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use git2::Sort;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from `to` but not from `from`, oldest first.
    ///
    /// With no `from` the whole history up to `to` is returned.
    #[instrument(skip(self))]
    pub fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let to_commit = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push(to_commit.id())?;
        if let Some(from) = from {
            let from_commit = self.resolve_commit(from)?;
            revwalk.hide(from_commit.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let paths = self.modified_paths(&commit)?;
            commits.push(commit_to_info(&commit).with_modified_paths(paths));
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    /// Paths changed relative to the first parent (or the empty tree)
    fn modified_paths(&self, commit: &git2::Commit<'_>) -> Result<Vec<PathBuf>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    if !paths.iter().any(|p: &PathBuf| p == path) {
                        paths.push(path.to_path_buf());
                    }
                }
            }
        }
        Ok(paths)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let hash = commit.id().to_string();
    let author = commit.author();

    let message = commit.summary().unwrap_or("(no message)").to_string();

    let body = commit.body().map(|b| b.to_string());

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        hash,
        message,
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(body.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::commit_files;
    use git2::{Oid, Repository};
    use std::path::Path;
    use tempfile::TempDir;

    fn setup_repo_with_commits() -> (TempDir, GitRepo, Oid) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_files(&repo, "Initial commit", &[("README.md", "hello")]);
        commit_files(&repo, "feat: add core", &[("core/lib.rs", "fn a() {}")]);
        commit_files(
            &repo,
            "fix(cli): handle args\n\nLonger body.\n\nBREAKING CHANGE: flags renamed",
            &[("cli/main.rs", "fn main() {}")],
        );

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo, first)
    }

    #[test]
    fn test_commits_between_is_oldest_first() {
        let (_temp, repo, _) = setup_repo_with_commits();
        let commits = repo.commits_between(None, "HEAD").unwrap();
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].message, "Initial commit");
        assert_eq!(commits[2].message, "fix(cli): handle args");
    }

    #[test]
    fn test_commits_between_excludes_from() {
        let (_temp, repo, first) = setup_repo_with_commits();
        let commits = repo
            .commits_between(Some(&first.to_string()), "HEAD")
            .unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "feat: add core");
    }

    #[test]
    fn test_commits_carry_modified_paths_and_body() {
        let (_temp, repo, _) = setup_repo_with_commits();
        let commits = repo.commits_between(None, "HEAD").unwrap();
        assert_eq!(commits[1].modified_paths, vec![Path::new("core/lib.rs")]);
        assert!(commits[2]
            .full_message()
            .contains("BREAKING CHANGE: flags renamed"));
    }
}
