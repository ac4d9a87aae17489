//! In-memory repository for tests and dry planning

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use gantry_core::error::GitError;
use gantry_core::version::Version;

use crate::release::ReleaseRepository;
use crate::repository::Result;
use crate::types::{CommitInfo, TagPattern};

/// A linear history kept in memory.
///
/// Commits get deterministic 40-character hex ids. Tag creation, pushes and
/// working tree resets are recorded so tests can assert on them.
pub struct MemoryRepository {
    root: PathBuf,
    commits: Vec<CommitInfo>,
    tags: RefCell<BTreeMap<String, String>>,
    pushed: RefCell<Vec<(String, String)>>,
    cleans: Cell<usize>,
}

impl MemoryRepository {
    /// Create an empty repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            commits: Vec::new(),
            tags: RefCell::new(BTreeMap::new()),
            pushed: RefCell::new(Vec::new()),
            cleans: Cell::new(0),
        }
    }

    /// Append a commit touching `paths` and return its sha
    pub fn add_commit(&mut self, message: &str, paths: &[&str]) -> String {
        let sha = fake_sha(self.commits.len() as u64);
        let (summary, body) = match message.split_once('\n') {
            Some((summary, body)) => (summary, body.trim_start_matches('\n')),
            None => (message, ""),
        };
        let info = CommitInfo::new(&sha, summary, "Test", "test@example.com", Utc::now())
            .with_body(body)
            .with_modified_paths(paths.iter().map(PathBuf::from).collect());
        self.commits.push(info);
        sha
    }

    /// Tag a commit
    pub fn add_tag(&mut self, name: impl Into<String>, sha: impl Into<String>) {
        self.tags.get_mut().insert(name.into(), sha.into());
    }

    /// Sha of the newest commit
    pub fn head(&self) -> Option<&str> {
        self.commits.last().map(|c| c.hash.as_str())
    }

    /// Pushed `(remote, tag)` pairs, in order
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    /// Number of working tree resets requested
    pub fn clean_count(&self) -> usize {
        self.cleans.get()
    }

    fn index_of(&self, reference: &str) -> Result<usize> {
        if reference == "HEAD" {
            return self
                .commits
                .len()
                .checked_sub(1)
                .ok_or_else(|| GitError::UnknownRef(reference.to_string()));
        }
        let sha = match self.tags.borrow().get(reference) {
            Some(sha) => sha.clone(),
            None => reference.to_string(),
        };
        self.commits
            .iter()
            .position(|c| !sha.is_empty() && c.hash.starts_with(&sha))
            .ok_or_else(|| GitError::UnknownRef(reference.to_string()))
    }
}

impl ReleaseRepository for MemoryRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn current_sha(&self, reference: &str) -> Result<String> {
        let index = self.index_of(reference)?;
        Ok(self.commits[index].hash.clone())
    }

    fn commit_info_sequence(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let end = self.index_of(to)?;
        let start = match from {
            Some(from) => self.index_of(from)? + 1,
            None => 0,
        };
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end].to_vec())
    }

    fn latest_tag_version(
        &self,
        pattern: &TagPattern,
        reference: &str,
    ) -> Result<Option<(Version, String)>> {
        let anchor = self.index_of(reference)?;
        let mut best: Option<(Version, String)> = None;
        for (name, sha) in self.tags.borrow().iter() {
            let Some(version) = pattern.version_of(name) else {
                continue;
            };
            if self.index_of(sha)? > anchor {
                continue;
            }
            if best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, sha.clone()));
            }
        }
        Ok(best)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.borrow().contains_key(name))
    }

    fn create_tag(&self, name: &str, target: &str, _message: Option<&str>) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(GitError::TagExists(name.to_string()));
        }
        let sha = self.current_sha(target)?;
        self.tags.borrow_mut().insert(name.to_string(), sha);
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        if !self.tag_exists(name)? {
            return Err(GitError::PushFailed(format!("no such tag {}", name)));
        }
        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }

    fn clean_working_tree(&self, _keep: &[PathBuf]) -> Result<()> {
        self.cleans.set(self.cleans.get() + 1);
        Ok(())
    }
}

/// Deterministic sha-like id with well-spread leading characters
fn fake_sha(n: u64) -> String {
    let mut state = n.wrapping_add(1);
    let mut out = String::with_capacity(40);
    while out.len() < 40 {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        out.push_str(&format!("{:016x}", z));
    }
    out.truncate(40);
    out
}
