//! Git types

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use gantry_core::version::Version;

/// Information about a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Commit message (first line)
    pub message: String,
    /// Rest of the commit message
    pub body: Option<String>,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Repository-relative paths the commit touched
    pub modified_paths: Vec<PathBuf>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = hash.chars().take(7).collect();

        Self {
            hash,
            short_hash,
            message: message.into(),
            body: None,
            author: author.into(),
            author_email: author_email.into(),
            timestamp,
            modified_paths: Vec::new(),
        }
    }

    /// Set the commit body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.trim().is_empty() {
            None
        } else {
            Some(body)
        };
        self
    }

    /// Set the touched paths
    pub fn with_modified_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.modified_paths = paths;
        self
    }

    /// Get the full message including body
    pub fn full_message(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.message, body),
            None => self.message.clone(),
        }
    }
}

/// Information about a git tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Commit hash the tag points to
    pub commit_hash: String,
    /// Tag message (for annotated tags)
    pub message: Option<String>,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(name: impl Into<String>, commit_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_hash: commit_hash.into(),
            message: None,
        }
    }

    /// Set the tag message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Release tags of one component, e.g. `core/v{version}`
#[derive(Debug, Clone)]
pub struct TagPattern {
    format: String,
    name: String,
    regex: Regex,
}

impl TagPattern {
    /// Build a pattern from a tag format containing `{name}` and `{version}`
    pub fn new(format: &str, name: &str) -> Self {
        let escaped = regex::escape(format)
            .replace(r"\{name\}", &regex::escape(name))
            .replace(r"\{version\}", r"(?P<version>\d+(?:\.\d+)*)");
        // Escaped literals and a fixed group always form a valid expression.
        let regex = Regex::new(&format!("^{}$", escaped)).expect("Invalid regex");
        Self {
            format: format.to_string(),
            name: name.to_string(),
            regex,
        }
    }

    /// Tag name for a version
    pub fn tag_for(&self, version: &Version) -> String {
        self.format
            .replace("{name}", &self.name)
            .replace("{version}", &version.to_string())
    }

    /// Version encoded in a tag name, if the tag belongs to this pattern
    pub fn version_of(&self, tag: &str) -> Option<Version> {
        self.regex
            .captures(tag)
            .and_then(|c| c.name("version"))
            .and_then(|m| Version::parse(m.as_str()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_pattern_extracts_version() {
        let pattern = TagPattern::new("{name}/v{version}", "core");
        assert_eq!(pattern.version_of("core/v1.2.3").unwrap().to_string(), "1.2.3");
        assert_eq!(pattern.version_of("core/v1.2.3.4").unwrap().to_string(), "1.2.3.4");
        assert!(pattern.version_of("cli/v1.2.3").is_none());
        assert!(pattern.version_of("core/v1.2.3-rc1").is_none());
    }

    #[test]
    fn test_tag_pattern_escapes_literal_characters() {
        let pattern = TagPattern::new("{name}-v{version}", "my.pkg");
        assert!(pattern.version_of("my.pkg-v1.0.0").is_some());
        assert!(pattern.version_of("myXpkg-v1.0.0").is_none());
        assert_eq!(
            pattern.tag_for(&Version::parse("2.0.0").unwrap()),
            "my.pkg-v2.0.0"
        );
    }

    #[test]
    fn test_commit_info() {
        let commit = CommitInfo::new(
            "abc1234567890",
            "feat: add feature",
            "Author",
            "author@example.com",
            Utc::now(),
        )
        .with_body("  \n");
        assert_eq!(commit.short_hash, "abc1234");
        assert!(commit.body.is_none());
        assert_eq!(commit.full_message(), "feat: add feature");
    }
}
