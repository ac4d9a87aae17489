//! Tag operations

use tracing::{debug, info, instrument};

use gantry_core::error::GitError;
use gantry_core::version::Version;

use crate::repository::{GitRepo, Result};
use crate::types::{TagInfo, TagPattern};

impl GitRepo {
    /// Get all tags
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                tags.push(TagInfo::new(&name, commit.id().to_string()));
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                // Annotated tag
                let mut tag_info = TagInfo::new(&name, tag.target_id().to_string());
                if let Some(msg) = tag.message() {
                    tag_info = tag_info.with_message(msg);
                }
                tags.push(tag_info);
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Highest version tagged with `pattern` on a commit reachable from `reference`
    #[instrument(skip(self, pattern))]
    pub fn latest_version_tag(
        &self,
        pattern: &TagPattern,
        reference: &str,
    ) -> Result<Option<(Version, String)>> {
        let anchor = self.resolve_commit(reference)?.id();

        let mut best: Option<(Version, String)> = None;
        for tag in self.tags()? {
            let Some(version) = pattern.version_of(&tag.name) else {
                continue;
            };
            let target = git2::Oid::from_str(&tag.commit_hash)?;
            let reachable = target == anchor || self.repo.graph_descendant_of(anchor, target)?;
            if !reachable {
                continue;
            }
            if best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, tag.commit_hash));
            }
        }

        debug!(
            latest = ?best.as_ref().map(|(v, _)| v.to_string()),
            "found latest version tag"
        );
        Ok(best)
    }

    /// Find a specific tag by name
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        let tag_ref = format!("refs/tags/{}", name);

        match self.repo.find_reference(&tag_ref) {
            Ok(reference) => {
                let target = reference.peel_to_commit()?;
                Ok(Some(TagInfo::new(name, target.id().to_string())))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Create a tag on `target`, annotated when a message is given
    #[instrument(skip(self), fields(name, annotated = message.is_some()))]
    pub fn create_tag(&self, name: &str, target: &str, message: Option<&str>) -> Result<TagInfo> {
        if self.find_tag(name)?.is_some() {
            return Err(GitError::TagExists(name.to_string()));
        }

        let commit = self.resolve_commit(target)?;

        if let Some(msg) = message {
            let sig = self.repo.signature()?;
            self.repo.tag(name, commit.as_object(), &sig, msg, false)?;
        } else {
            self.repo.tag_lightweight(name, commit.as_object(), false)?;
        }

        info!(name, annotated = message.is_some(), "created tag");
        Ok(TagInfo::new(name, commit.id().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::commit_files;
    use git2::Repository;
    use tempfile::TempDir;

    fn setup_repo_with_tags() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_files(&repo, "Initial commit", &[("file.txt", "a")]);
        let commit = repo.find_commit(first).unwrap();
        repo.tag_lightweight("core/v1.0.0", commit.as_object(), false)
            .unwrap();
        repo.tag_lightweight("cli/v3.0.0", commit.as_object(), false)
            .unwrap();

        let second = commit_files(&repo, "feat: more", &[("file.txt", "b")]);
        let commit = repo.find_commit(second).unwrap();
        repo.tag_lightweight("core/v1.1.0", commit.as_object(), false)
            .unwrap();

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_list_tags() {
        let (_temp, repo) = setup_repo_with_tags();
        let tags = repo.tags().unwrap();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_latest_version_tag_for_component() {
        let (_temp, repo) = setup_repo_with_tags();
        let pattern = TagPattern::new("{name}/v{version}", "core");
        let (version, sha) = repo.latest_version_tag(&pattern, "HEAD").unwrap().unwrap();
        assert_eq!(version.to_string(), "1.1.0");
        assert_eq!(sha, repo.resolve_commit("HEAD").unwrap().id().to_string());
    }

    #[test]
    fn test_latest_version_tag_respects_reachability() {
        let (_temp, repo) = setup_repo_with_tags();
        let pattern = TagPattern::new("{name}/v{version}", "core");
        let (version, _) = repo
            .latest_version_tag(&pattern, "core/v1.0.0")
            .unwrap()
            .unwrap();
        assert_eq!(version.to_string(), "1.0.0");
    }

    #[test]
    fn test_latest_version_tag_none() {
        let (_temp, repo) = setup_repo_with_tags();
        let pattern = TagPattern::new("{name}/v{version}", "docs");
        assert!(repo.latest_version_tag(&pattern, "HEAD").unwrap().is_none());
    }

    #[test]
    fn test_create_tag_on_target() {
        let (_temp, repo) = setup_repo_with_tags();
        let tag = repo.create_tag("cli/v3.1.0", "core/v1.0.0", None).unwrap();
        let expected = repo.find_tag("core/v1.0.0").unwrap().unwrap();
        assert_eq!(tag.commit_hash, expected.commit_hash);
    }

    #[test]
    fn test_tag_already_exists() {
        let (_temp, repo) = setup_repo_with_tags();
        let result = repo.create_tag("core/v1.0.0", "HEAD", None);
        assert!(matches!(result, Err(GitError::TagExists(_))));
    }
}
