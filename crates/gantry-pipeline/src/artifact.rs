//! Artifact directories shared between steps

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument};

use gantry_core::error::Result;

/// A namespace of scratch directories.
///
/// Every directory lives at `base/<id>[-name]`, where `id` is random per
/// instance. The base is a fresh temporary directory unless the caller
/// supplies one; only an implicit base is removed by [`cleanup`].
///
/// [`cleanup`]: ArtifactDir::cleanup
#[derive(Debug)]
pub struct ArtifactDir {
    supplied: Option<PathBuf>,
    temp: Option<TempDir>,
    id: String,
    paths: HashMap<String, PathBuf>,
}

impl ArtifactDir {
    /// Artifact directories under an implicit temporary base
    pub fn new() -> Self {
        Self {
            supplied: None,
            temp: None,
            id: random_id(),
            paths: HashMap::new(),
        }
    }

    /// Artifact directories under a caller-owned base
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            supplied: Some(base.into()),
            ..Self::new()
        }
    }

    /// Base directory, if it exists yet
    pub fn base(&self) -> Option<&Path> {
        self.supplied
            .as_deref()
            .or_else(|| self.temp.as_ref().map(TempDir::path))
    }

    fn ensure_base(&mut self) -> Result<PathBuf> {
        if let Some(base) = &self.supplied {
            fs::create_dir_all(base)?;
            return Ok(base.clone());
        }
        if self.temp.is_none() {
            let temp = tempfile::Builder::new().prefix("gantry-").tempdir()?;
            debug!(path = %temp.path().display(), "created artifact base");
            self.temp = Some(temp);
        }
        Ok(self
            .temp
            .as_ref()
            .map(|t| t.path().to_path_buf())
            .unwrap_or_default())
    }

    /// Directory for a logical name, created empty on first use.
    ///
    /// Later calls with the same name return the same path without touching
    /// its contents. An empty name gives the bare `base/<id>` directory.
    #[instrument(skip(self))]
    pub fn get(&mut self, name: &str) -> Result<PathBuf> {
        if let Some(path) = self.paths.get(name) {
            return Ok(path.clone());
        }

        let base = self.ensure_base()?;
        let dir_name = if name.is_empty() {
            self.id.clone()
        } else {
            format!("{}-{}", self.id, name)
        };
        let path = base.join(dir_name);
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else if path.exists() {
            fs::remove_file(&path)?;
        }
        fs::create_dir_all(&path)?;

        debug!(path = %path.display(), "created artifact directory");
        self.paths.insert(name.to_string(), path.clone());
        Ok(path)
    }

    /// Output directory of a step
    pub fn output(&mut self, step: &str) -> Result<PathBuf> {
        self.get(&format!("output-{}", step))
    }

    /// Private scratch directory of a step
    pub fn temp(&mut self, step: &str) -> Result<PathBuf> {
        self.get(&format!("temp-{}", step))
    }

    /// Remove the implicit base and everything in it. Safe to call again.
    pub fn cleanup(&mut self) -> Result<()> {
        self.paths.clear();
        if let Some(temp) = self.temp.take() {
            debug!(path = %temp.path().display(), "removing artifact base");
            temp.close()?;
        }
        Ok(())
    }
}

impl Default for ArtifactDir {
    fn default() -> Self {
        Self::new()
    }
}

fn random_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..10].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_is_memoized_and_wipes_once() {
        let mut artifacts = ArtifactDir::new();
        let first = artifacts.get("x").unwrap();
        assert!(first.is_dir());
        assert_eq!(fs::read_dir(&first).unwrap().count(), 0);

        fs::write(first.join("built.txt"), "data").unwrap();
        let second = artifacts.get("x").unwrap();
        assert_eq!(first, second);
        assert!(second.join("built.txt").exists());
    }

    #[test]
    fn test_paths_are_namespaced() {
        let mut artifacts = ArtifactDir::new();
        let bare = artifacts.get("").unwrap();
        let output = artifacts.output("build").unwrap();
        let temp = artifacts.temp("build").unwrap();

        let bare_name = bare.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(bare_name.len(), 10);
        assert_eq!(
            output.file_name().unwrap().to_string_lossy(),
            format!("{}-output-build", bare_name)
        );
        assert_ne!(output, temp);
        assert_eq!(output.parent(), bare.parent());
    }

    #[test]
    fn test_first_get_replaces_stale_entry() {
        let base = TempDir::new().unwrap();
        let mut artifacts = ArtifactDir::with_base(base.path());
        let id = artifacts.id.clone();
        let stale = base.path().join(format!("{}-x", id));
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("old.txt"), "old").unwrap();

        let path = artifacts.get("x").unwrap();
        assert_eq!(path, stale);
        assert!(!path.join("old.txt").exists());
    }

    #[test]
    fn test_cleanup_removes_implicit_base_only() {
        let mut implicit = ArtifactDir::new();
        implicit.get("x").unwrap();
        let base = implicit.base().unwrap().to_path_buf();
        implicit.cleanup().unwrap();
        implicit.cleanup().unwrap();
        assert!(!base.exists());
        assert!(implicit.base().is_none());

        let supplied = TempDir::new().unwrap();
        let mut explicit = ArtifactDir::with_base(supplied.path());
        let path = explicit.get("x").unwrap();
        explicit.cleanup().unwrap();
        assert!(supplied.path().exists());
        assert!(path.exists());
    }

    #[test]
    fn test_base_is_lazy() {
        let artifacts = ArtifactDir::new();
        assert!(artifacts.base().is_none());
    }
}
