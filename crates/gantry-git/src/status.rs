//! Repository status and working tree operations

use std::path::Path;

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Whether the working tree has no staged, modified or untracked files
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut opts))?;
        let dirty = statuses
            .iter()
            .any(|entry| !entry.status().is_empty() && !entry.status().is_ignored());
        Ok(!dirty)
    }

    /// Checked-out branch, `None` when HEAD is detached or unborn
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(head
            .is_branch()
            .then(|| head.shorthand().map(str::to_string))
            .flatten())
    }

    /// Restore a pristine working tree.
    ///
    /// Removes every untracked and ignored file, then hard-resets tracked
    /// files to HEAD. Paths in `keep` (relative to the repository root)
    /// survive the clean.
    #[instrument(skip(self, keep))]
    pub fn reset_working_tree(&self, keep: &[&Path]) -> Result<()> {
        let mut args: Vec<String> = vec!["clean".into(), "-d".into(), "-f".into(), "-x".into()];
        for path in keep {
            args.push("-e".into());
            args.push(format!("/{}", path.display()));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_git(&arg_refs)?;
        self.run_git(&["reset", "--hard", "--quiet"])?;
        info!(kept = keep.len(), "working tree reset");
        Ok(())
    }
}
