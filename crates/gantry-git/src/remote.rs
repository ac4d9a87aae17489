//! Remote operations

use tracing::{info, instrument};

use gantry_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Get list of remote names
    pub fn remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes
            .iter()
            .filter_map(|r| r.map(|s| s.to_string()))
            .collect())
    }

    /// Check if a remote exists
    pub fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self.remotes()?.contains(&name.to_string()))
    }

    /// Push a tag to a remote.
    ///
    /// Shells out to git so the user's credential helpers apply.
    #[instrument(skip(self), fields(remote_name, tag_name))]
    pub fn push_tag(&self, remote_name: &str, tag_name: &str) -> Result<()> {
        if !self.has_remote(remote_name)? {
            return Err(GitError::RemoteNotFound(remote_name.to_string()));
        }

        let start = std::time::Instant::now();
        let refspec = format!("refs/tags/{}", tag_name);
        self.run_git(&["push", remote_name, &refspec])
            .map_err(|e| GitError::PushFailed(format!("Failed to push tag {}: {}", tag_name, e)))?;

        info!(
            remote = remote_name,
            tag = tag_name,
            duration_ms = start.elapsed().as_millis(),
            "pushed tag"
        );
        Ok(())
    }
}
