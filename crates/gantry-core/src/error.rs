//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Release request resolution errors
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Pipeline-related errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Component referenced but not configured
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Reference could not be resolved
    #[error("Unknown git reference: {0}")]
    UnknownRef(String),

    /// Tag already exists
    #[error("Tag already exists: {0}")]
    TagExists(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// A git subprocess exited unsuccessfully
    #[error("git {command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Unknown semver level name
    #[error("Unknown semver level: {0}")]
    UnknownLevel(String),

    /// The version file does not hold a version constant
    #[error("No version constant found in {0}")]
    ConstantNotFound(PathBuf),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Changelog file not found
    #[error("Changelog file not found at {0}")]
    FileNotFound(PathBuf),

    /// Failed to write changelog
    #[error("Failed to write changelog: {0}")]
    WriteFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accumulated problems found while resolving a release request.
///
/// Resolution keeps going after the first conflict so that every problem is
/// reported in one pass.
#[derive(Debug, Error)]
#[error("Release request could not be resolved:\n  - {}", .problems.join("\n  - "))]
pub struct ResolutionError {
    /// One human-readable line per problem
    pub problems: Vec<String>,
}

impl ResolutionError {
    /// Create from a list of problems
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }
}

/// Pipeline-related errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Step type not present in the registry
    #[error("Unknown step type '{step_type}' for step '{step}'")]
    UnknownStepType { step: String, step_type: String },

    /// Dependency missing among the steps declared before this one
    #[error("Dependency '{dependency}' not found before step '{step}'")]
    DependencyNotFound { step: String, dependency: String },

    /// Two steps share a name
    #[error("Duplicate step name: {0}")]
    DuplicateStep(String),

    /// Step options failed to deserialize or are missing
    #[error("Invalid options for step '{step}': {message}")]
    InvalidOptions { step: String, message: String },

    /// Artifact copy hit an existing file under the `error` collision policy
    #[error("Artifact collision in step '{step}' at {path}")]
    ArtifactCollision { step: String, path: PathBuf },

    /// Artifact to copy does not exist
    #[error("Artifact for step '{step}' not found at {path}")]
    ArtifactMissing { step: String, path: PathBuf },

    /// A step failed in a way the pipeline cannot contain
    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },
}

impl GantryError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_lists_every_problem() {
        let err = ResolutionError::new(vec![
            "first problem".to_string(),
            "second problem".to_string(),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("  - first problem"));
        assert!(rendered.contains("  - second problem"));
    }

    #[test]
    fn test_pipeline_error_wraps_transparently() {
        let err: GantryError = PipelineError::DependencyNotFound {
            step: "publish".to_string(),
            dependency: "build".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Dependency 'build' not found before step 'publish'"
        );
    }
}
