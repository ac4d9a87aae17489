//! Accessors for the files a release rewrites
//!
//! Both accessors patch text in place with regular expressions and leave
//! every other byte of the file untouched.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{ChangelogError, Result, VersionError};
use crate::version::Version;

/// Heading of a released changelog section: `### v1.2.3 / 2024-05-01`
static CHANGELOG_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^### v(?P<version>\d+(?:\.\d+)*)(?: / .*)?$").expect("Invalid regex")
});

/// Version constant assignment: `VERSION = "1.2.3"`
static VERSION_CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(?P<prefix>\s*(?:pub\s+)?(?:const\s+)?VERSION(?:\s*:\s*&str)?\s*=\s*)(?P<quote>["'])(?P<version>[^"']+)["']"#)
        .expect("Invalid regex")
});

/// A component's markdown changelog
#[derive(Debug, Clone)]
pub struct ChangelogFile {
    path: PathBuf,
}

impl ChangelogFile {
    /// Create an accessor for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the changelog
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the changelog exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Version of the newest section, if any
    pub fn current_version(&self) -> Result<Option<Version>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(ChangelogError::Io)?;
        let version = CHANGELOG_HEADING
            .captures(&content)
            .and_then(|c| c.name("version"))
            .map(|m| Version::parse(m.as_str()))
            .transpose()?;
        Ok(version)
    }

    /// Insert a rendered entry above the newest section.
    ///
    /// A leading `# Title` line and the blank lines after it stay on top.
    /// A missing file is created with `title` as its first line.
    pub fn prepend_entry(&self, entry: &str, title: &str) -> Result<()> {
        let existing = if self.exists() {
            std::fs::read_to_string(&self.path).map_err(ChangelogError::Io)?
        } else {
            format!("# {}\n", title)
        };

        let split = match CHANGELOG_HEADING.find(&existing) {
            Some(m) => m.start(),
            None => existing.len(),
        };
        let (head, tail) = existing.split_at(split);

        let mut content = head.trim_end().to_string();
        if !content.is_empty() {
            content.push_str("\n\n");
        }
        content.push_str(entry.trim_end());
        content.push('\n');
        if !tail.is_empty() {
            content.push('\n');
            content.push_str(tail);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ChangelogError::Io)?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| ChangelogError::WriteFailed(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "changelog entry prepended");
        Ok(())
    }
}

/// A source file holding a single `VERSION = "x.y.z"` constant
#[derive(Debug, Clone)]
pub struct VersionFile {
    path: PathBuf,
}

impl VersionFile {
    /// Create an accessor for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the version file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the version constant
    pub fn read_version(&self) -> Result<Version> {
        let content = std::fs::read_to_string(&self.path)?;
        let raw = VERSION_CONSTANT
            .captures(&content)
            .and_then(|c| c.name("version"))
            .ok_or_else(|| VersionError::ConstantNotFound(self.path.clone()))?;
        Ok(Version::parse(raw.as_str())?)
    }

    /// Rewrite the version constant, keeping the quote style
    pub fn update_version(&self, version: &Version) -> Result<()> {
        let content = std::fs::read_to_string(&self.path)?;
        if !VERSION_CONSTANT.is_match(&content) {
            return Err(VersionError::ConstantNotFound(self.path.clone()).into());
        }
        let replacement = format!("${{prefix}}${{quote}}{}${{quote}}", version);
        let updated = VERSION_CONSTANT.replace(&content, replacement.as_str());
        std::fs::write(&self.path, updated.as_ref())?;
        debug!(path = %self.path.display(), version = %version, "version constant updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_changelog_current_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CHANGELOG.md");
        std::fs::write(
            &path,
            "# Release History\n\n### v1.2.0 / 2024-03-01\n\n* Feat\n\n### v1.1.0 / 2024-01-01\n",
        )
        .unwrap();

        let changelog = ChangelogFile::new(&path);
        assert_eq!(changelog.current_version().unwrap().unwrap().to_string(), "1.2.0");
    }

    #[test]
    fn test_changelog_missing_has_no_version() {
        let temp = TempDir::new().unwrap();
        let changelog = ChangelogFile::new(temp.path().join("CHANGELOG.md"));
        assert!(changelog.current_version().unwrap().is_none());
    }

    #[test]
    fn test_prepend_entry_keeps_title_and_history() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CHANGELOG.md");
        std::fs::write(
            &path,
            "# Release History\n\n### v1.0.0 / 2024-01-01\n\n* Initial release\n",
        )
        .unwrap();

        let changelog = ChangelogFile::new(&path);
        changelog
            .prepend_entry("### v1.1.0 / 2024-02-01\n\n* FEATURE: Add things\n", "Release History")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Release History\n\n### v1.1.0 / 2024-02-01\n\n* FEATURE: Add things\n\n### v1.0.0 / 2024-01-01\n\n* Initial release\n"
        );
        assert_eq!(changelog.current_version().unwrap().unwrap().to_string(), "1.1.0");
    }

    #[test]
    fn test_prepend_entry_creates_file() {
        let temp = TempDir::new().unwrap();
        let changelog = ChangelogFile::new(temp.path().join("core").join("CHANGELOG.md"));
        changelog
            .prepend_entry("### v0.1.0 / 2024-02-01\n\n* Initial\n", "Release History")
            .unwrap();

        let content = std::fs::read_to_string(changelog.path()).unwrap();
        assert!(content.starts_with("# Release History\n\n### v0.1.0"));
    }

    #[test]
    fn test_version_file_roundtrip_preserves_surroundings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.rb");
        std::fs::write(
            &path,
            "module Gantry\n  VERSION = \"1.2.3\"\n  OTHER = \"x\"\nend\n",
        )
        .unwrap();

        let file = VersionFile::new(&path);
        assert_eq!(file.read_version().unwrap().to_string(), "1.2.3");

        file.update_version(&Version::parse("1.3.0").unwrap()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "module Gantry\n  VERSION = \"1.3.0\"\n  OTHER = \"x\"\nend\n"
        );
    }

    #[test]
    fn test_version_file_rust_constant() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.rs");
        std::fs::write(&path, "pub const VERSION: &str = \"0.4.1\";\n").unwrap();

        let file = VersionFile::new(&path);
        assert_eq!(file.read_version().unwrap().to_string(), "0.4.1");
        file.update_version(&Version::parse("0.5.0").unwrap()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "pub const VERSION: &str = \"0.5.0\";\n"
        );
    }

    #[test]
    fn test_version_file_without_constant() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.rb");
        std::fs::write(&path, "# nothing here\n").unwrap();
        assert!(VersionFile::new(&path).read_version().is_err());
    }
}
