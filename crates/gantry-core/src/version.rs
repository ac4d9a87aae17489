//! Dotted numeric release versions

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A release version made of dot-separated numeric segments.
///
/// Unlike strict SemVer this accepts any number of segments, so a fourth
/// "patch2" segment (`1.2.3.4`) is representable. Missing trailing segments
/// compare as zero: `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Create a version from its segments
    pub fn new(segments: impl Into<Vec<u64>>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    /// The `0.0.0` version used when nothing has been released yet
    pub fn zero() -> Self {
        Self::new(vec![0, 0, 0])
    }

    /// Parse a version, allowing a leading `v`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if raw.is_empty() {
            return Err(VersionError::ParseFailed(
                input.to_string(),
                "empty version".to_string(),
            ));
        }

        let segments = raw
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|e| {
                    VersionError::ParseFailed(input.to_string(), format!("segment '{part}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// All segments as written
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Segment at `index`, zero when absent
    pub fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}
