//! Semver significance levels and version bump arithmetic

use serde::{Deserialize, Serialize};

use crate::error::VersionError;
use crate::version::Version;

/// Significance of a change, ordered from `None` (least) to `Major` (most).
///
/// Each level except `None` addresses one version segment: major is the
/// first, minor the second, patch the third and patch2 the fourth.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Semver {
    /// No release needed
    #[default]
    None,
    /// Fourth-segment bump
    Patch2,
    /// Bug fix
    Patch,
    /// New feature
    Minor,
    /// Breaking change
    Major,
}

impl Semver {
    /// All levels, most significant first
    pub const ALL: [Semver; 5] = [
        Semver::Major,
        Semver::Minor,
        Semver::Patch,
        Semver::Patch2,
        Semver::None,
    ];

    /// Look up a level by name
    pub fn for_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "patch" => Some(Self::Patch),
            "patch2" => Some(Self::Patch2),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Level addressing a segment index. Indexes past patch2 map to patch2.
    pub fn for_segment(index: usize) -> Self {
        match index {
            0 => Self::Major,
            1 => Self::Minor,
            2 => Self::Patch,
            _ => Self::Patch2,
        }
    }

    /// The level of the most significant segment that differs between two
    /// versions, or `None` when they are identical.
    pub fn for_diff(v1: &Version, v2: &Version) -> Self {
        let len = v1.segments().len().max(v2.segments().len());
        (0..len)
            .find(|&i| v1.segment(i) != v2.segment(i))
            .map(Self::for_segment)
            .unwrap_or(Self::None)
    }

    /// Returns the string representation of the level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Patch2 => "patch2",
            Self::None => "none",
        }
    }

    /// Index of the segment this level increments
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::Major => Some(0),
            Self::Minor => Some(1),
            Self::Patch => Some(2),
            Self::Patch2 => Some(3),
            Self::None => None,
        }
    }

    /// Whether this level calls for a release
    pub fn is_significant(&self) -> bool {
        *self != Self::None
    }

    /// Bump a version at this level.
    ///
    /// A missing version counts as `0.0.0`. While the major segment is zero a
    /// major bump increments the minor segment instead. Every segment after
    /// the bumped one is zeroed, and the result always has at least three
    /// segments. `None` returns the version unchanged, and a segment already
    /// at `u64::MAX` stays there.
    pub fn bump(&self, version: Option<&Version>) -> Version {
        let base = version.cloned().unwrap_or_else(Version::zero);
        let Some(mut index) = self.segment_index() else {
            return base;
        };
        if index == 0 && base.segment(0) == 0 {
            index = 1;
        }

        let mut segments: Vec<u64> = (0..=index).map(|i| base.segment(i)).collect();
        segments[index] = segments[index].saturating_add(1);
        while segments.len() < 3 {
            segments.push(0);
        }
        Version::new(segments)
    }
}

impl std::fmt::Display for Semver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Semver {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s).ok_or_else(|| VersionError::UnknownLevel(s.to_string()))
    }
}
