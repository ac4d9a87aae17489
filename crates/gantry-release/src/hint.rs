//! Requested versions

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use gantry_core::error::VersionError;
use gantry_core::semver::Semver;
use gantry_core::version::Version;

/// What the user asked for a component's next version
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum VersionHint {
    /// Derive the version from the commits
    #[default]
    Infer,
    /// Bump at this level regardless of the commits
    Level(Semver),
    /// Release exactly this version
    Exact(Version),
}

impl VersionHint {
    /// Combine two hints for the same coordination group.
    ///
    /// `Infer` yields to anything; two different explicit hints conflict.
    pub fn merge(&self, other: &VersionHint) -> Option<VersionHint> {
        match (self, other) {
            (VersionHint::Infer, hint) | (hint, VersionHint::Infer) => Some(hint.clone()),
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for VersionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infer => write!(f, "inferred"),
            Self::Level(level) => write!(f, "{}", level),
            Self::Exact(version) => write!(f, "{}", version),
        }
    }
}

impl FromStr for VersionHint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Infer);
        }
        match Semver::for_name(s) {
            Some(Semver::None) => Err(VersionError::UnknownLevel(s.to_string())),
            Some(level) => Ok(Self::Level(level)),
            None => Ok(Self::Exact(Version::parse(s)?)),
        }
    }
}

/// One `name[=version]` item of a release request; the name `all` selects
/// every component with releasable changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Component name, or `all`
    pub name: String,
    /// Requested version
    pub hint: VersionHint,
}

impl ComponentSpec {
    /// Whether this spec selects every changed component
    pub fn is_all(&self) -> bool {
        self.name == "all"
    }
}

impl FromStr for ComponentSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, hint) = match s.split_once('=') {
            Some((name, hint)) => (name, hint.parse()?),
            None => (s, VersionHint::Infer),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(VersionError::ParseFailed(
                s.to_string(),
                "missing component name".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            hint,
        })
    }
}
