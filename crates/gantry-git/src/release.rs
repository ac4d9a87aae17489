//! Repository collaborator used by the release engine

use std::path::{Path, PathBuf};

use gantry_core::version::Version;

use crate::repository::{GitRepo, Result};
use crate::types::{CommitInfo, TagPattern};

/// Everything the release engine needs from version control.
///
/// Implemented by [`GitRepo`] for real repositories and by
/// [`MemoryRepository`](crate::MemoryRepository) for tests.
pub trait ReleaseRepository {
    /// Root of the working tree
    fn root(&self) -> &Path;

    /// Full sha of a ref, tag or sha prefix
    fn current_sha(&self, reference: &str) -> Result<String>;

    /// Commits after `from` up to and including `to`, oldest first
    fn commit_info_sequence(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>>;

    /// Latest released version matching `pattern` reachable from `reference`,
    /// with the sha of the tagged commit
    fn latest_tag_version(
        &self,
        pattern: &TagPattern,
        reference: &str,
    ) -> Result<Option<(Version, String)>>;

    /// Whether a tag exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a tag on a commit
    fn create_tag(&self, name: &str, target: &str, message: Option<&str>) -> Result<()>;

    /// Push a tag to a remote
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Remove untracked files and hard-reset tracked ones, sparing `keep`
    fn clean_working_tree(&self, keep: &[PathBuf]) -> Result<()>;
}

impl ReleaseRepository for GitRepo {
    fn root(&self) -> &Path {
        self.path()
    }

    fn current_sha(&self, reference: &str) -> Result<String> {
        Ok(self.resolve_commit(reference)?.id().to_string())
    }

    fn commit_info_sequence(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        self.commits_between(from, to)
    }

    fn latest_tag_version(
        &self,
        pattern: &TagPattern,
        reference: &str,
    ) -> Result<Option<(Version, String)>> {
        self.latest_version_tag(pattern, reference)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.find_tag(name)?.is_some())
    }

    fn create_tag(&self, name: &str, target: &str, message: Option<&str>) -> Result<()> {
        GitRepo::create_tag(self, name, target, message).map(|_| ())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        GitRepo::push_tag(self, remote, name)
    }

    fn clean_working_tree(&self, keep: &[PathBuf]) -> Result<()> {
        let relative: Vec<&Path> = keep
            .iter()
            .filter_map(|p| p.strip_prefix(self.path()).ok())
            .collect();
        self.reset_working_tree(&relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::commit_files;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_git_repo_as_release_repository() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let first = commit_files(&repo, "feat: first", &[("core/a.rs", "a")]);
        commit_files(&repo, "fix: second", &[("core/b.rs", "b")]);

        let git: Box<dyn ReleaseRepository> = Box::new(GitRepo::open(temp.path()).unwrap());
        let head = git.current_sha("HEAD").unwrap();

        git.create_tag("core/v0.1.0", &first.to_string(), None).unwrap();
        assert!(git.tag_exists("core/v0.1.0").unwrap());

        let pattern = TagPattern::new("{name}/v{version}", "core");
        let (version, sha) = git.latest_tag_version(&pattern, &head).unwrap().unwrap();
        assert_eq!(version.to_string(), "0.1.0");

        let commits = git.commit_info_sequence(Some(&sha), &head).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "fix: second");
    }

    #[test]
    fn test_clean_working_tree_spares_absolute_keep_paths() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_files(&repo, "initial", &[("a.txt", "a")]);
        let git = GitRepo::open(temp.path()).unwrap();

        let keep = temp.path().join(".artifacts");
        std::fs::create_dir_all(&keep).unwrap();
        std::fs::write(keep.join("x"), "x").unwrap();
        std::fs::write(temp.path().join("junk"), "junk").unwrap();

        git.clean_working_tree(&[keep.clone()]).unwrap();
        assert!(keep.join("x").exists());
        assert!(!temp.path().join("junk").exists());
    }
}
