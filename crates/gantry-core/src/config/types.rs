//! Configuration types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::semver::Semver;

use super::defaults::{default_commit_tags, default_steps};

/// Main configuration for Gantry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name
    pub name: Option<String>,

    /// Git configuration
    pub git: GitConfig,

    /// Change classification and changelog rendering
    pub changelog: ChangelogConfig,

    /// Releasable components
    pub components: Vec<ComponentConfig>,

    /// Groups of component names that always release together
    pub coordination_groups: Vec<Vec<String>>,

    /// Pipeline used by components that do not declare their own steps
    pub steps: Vec<StepSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            git: GitConfig::default(),
            changelog: ChangelogConfig::default(),
            components: Vec::new(),
            coordination_groups: Vec::new(),
            steps: default_steps(),
        }
    }
}

impl Config {
    /// Find a component configuration by name
    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name
    pub remote: String,

    /// Branch releases are cut from
    pub main_branch: String,

    /// Ref that anchors a release request when none is given
    pub release_ref: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            main_branch: "main".to_string(),
            release_ref: "HEAD".to_string(),
        }
    }
}

/// What to do with a trailing `(#123)` on a change description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueNumberSuffix {
    /// Leave the suffix as written
    #[default]
    Keep,
    /// Remove the suffix
    Delete,
    /// Turn the issue number into a link to the hosting repository
    Link,
}

/// Change classification and changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Ordered commit tag table; order also decides changelog group order
    pub commit_tags: Vec<CommitTagSettings>,

    /// Header of the synthetic breaking-change group
    pub breaking_change_header: String,

    /// Entry injected when a release has no classified changes
    pub no_significant_updates_notice: String,

    /// Header for entries created by dependency-triggered releases
    pub dependency_update_header: String,

    /// Handling of `(#123)` suffixes
    pub issue_number_suffix: IssueNumberSuffix,

    /// Hosting repository as `owner/name`, used for issue links
    pub repo: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            commit_tags: default_commit_tags(),
            breaking_change_header: "Breaking Changes".to_string(),
            no_significant_updates_notice: "No significant updates.".to_string(),
            dependency_update_header: "Dependencies".to_string(),
            issue_number_suffix: IssueNumberSuffix::Keep,
            repo: None,
        }
    }
}

impl ChangelogConfig {
    /// Look up a commit tag
    pub fn commit_tag(&self, tag: &str) -> Option<&CommitTagSettings> {
        self.commit_tags.iter().find(|t| t.tag == tag)
    }

    /// Headers in the order groups should be rendered (breaking group excluded)
    pub fn headers(&self) -> Vec<&str> {
        let mut headers: Vec<&str> = Vec::new();
        let candidates = self.commit_tags.iter().flat_map(|t| {
            std::iter::once(t.header.as_deref())
                .chain(t.scopes.values().map(|s| s.header.as_deref()))
        });
        for header in candidates.flatten() {
            if !headers.contains(&header) {
                headers.push(header);
            }
        }
        if !headers.contains(&self.dependency_update_header.as_str()) {
            headers.push(&self.dependency_update_header);
        }
        headers
    }
}

/// Classification for one conventional commit tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTagSettings {
    /// Tag as written in the commit (`feat`, `fix`, ...)
    pub tag: String,

    /// Significance of a change with this tag
    #[serde(default)]
    pub semver: Semver,

    /// Changelog header; `None` hides the change from the changelog
    #[serde(default)]
    pub header: Option<String>,

    /// Per-scope overrides, e.g. `fix(deps)`
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeSettings>,
}

impl CommitTagSettings {
    /// Create a tag entry
    pub fn new(tag: impl Into<String>, semver: Semver, header: Option<&str>) -> Self {
        Self {
            tag: tag.into(),
            semver,
            header: header.map(str::to_string),
            scopes: BTreeMap::new(),
        }
    }

    /// Add a scope override
    pub fn with_scope(mut self, scope: impl Into<String>, settings: ScopeSettings) -> Self {
        self.scopes.insert(scope.into(), settings);
        self
    }

    /// Semver level and header for an optional scope
    pub fn classify(&self, scope: Option<&str>) -> (Semver, Option<&str>) {
        match scope.and_then(|s| self.scopes.get(s)) {
            Some(scoped) => (scoped.semver, scoped.header.as_deref()),
            None => (self.semver, self.header.as_deref()),
        }
    }
}

/// Override for a tag used with a particular scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSettings {
    /// Significance of the scoped change
    #[serde(default)]
    pub semver: Semver,

    /// Changelog header; `None` hides the change
    #[serde(default)]
    pub header: Option<String>,
}

/// Configuration of one releasable component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Component name, unique in the repository
    pub name: String,

    /// Directory relative to the repository root
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Changelog path relative to the component directory
    #[serde(default = "default_changelog_path")]
    pub changelog_path: PathBuf,

    /// Version constant file relative to the component directory
    #[serde(default)]
    pub version_file: Option<PathBuf>,

    /// Tag format; `{name}` and `{version}` are substituted
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Extra globs (repository relative) whose changes count for this component
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Globs (repository relative) whose changes never count for this component
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Dependency-triggered release settings
    #[serde(default)]
    pub update_dependencies: Option<DependencyUpdateConfig>,

    /// Pipeline override; falls back to the top-level steps
    #[serde(default)]
    pub steps: Option<Vec<StepSettings>>,
}

impl ComponentConfig {
    /// Create a component rooted at `directory`
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            changelog_path: default_changelog_path(),
            version_file: None,
            tag_format: default_tag_format(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            update_dependencies: None,
            steps: None,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_tag_format() -> String {
    "{name}/v{version}".to_string()
}

/// Dependency-triggered ("kitchen sink") release settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyUpdateConfig {
    /// Names of the components this one depends on
    pub dependencies: Vec<String>,

    /// Minimum dependency bump that triggers a release of this component
    #[serde(default = "default_dependency_threshold")]
    pub dependency_semver_threshold: Semver,

    /// Coarsest level the published dependency constraint may float within
    #[serde(default = "default_pessimistic_level")]
    pub pessimistic_constraint_level: Semver,
}

fn default_dependency_threshold() -> Semver {
    Semver::Minor
}

fn default_pessimistic_level() -> Semver {
    Semver::Minor
}

/// Settings for one pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSettings {
    /// Step name, unique within the pipeline
    pub name: String,

    /// Registered step type
    #[serde(rename = "type")]
    pub step_type: String,

    /// Explicitly requested: run even when the step is not primary
    #[serde(default)]
    pub run: bool,

    /// Reset the working tree before running
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Turn step failures into pipeline aborts
    #[serde(default)]
    pub abort_pipeline_on_error: bool,

    /// Artifacts consumed from earlier steps
    #[serde(default)]
    pub inputs: Vec<InputSettings>,

    /// Extra artifacts exported to this step's output directory
    #[serde(default)]
    pub outputs: Vec<OutputSettings>,

    /// Step-specific options
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl StepSettings {
    /// Create settings for a step
    pub fn new(name: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step_type: step_type.into(),
            run: false,
            clean: true,
            abort_pipeline_on_error: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    /// Mark as explicitly requested
    pub fn with_run(mut self, run: bool) -> Self {
        self.run = run;
        self
    }

    /// Set whether the working tree is reset first
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Set whether failures abort the pipeline
    pub fn with_abort_on_error(mut self, abort: bool) -> Self {
        self.abort_pipeline_on_error = abort;
        self
    }

    /// Add an input
    pub fn with_input(mut self, input: InputSettings) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an output
    pub fn with_output(mut self, output: OutputSettings) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set a raw option
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

fn default_true() -> bool {
    true
}

/// Where copied input artifacts land
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputDestination {
    /// The component directory
    #[default]
    Component,
    /// The repository root
    RepoRoot,
    /// The consuming step's output directory
    Output,
    /// The consuming step's private temp directory
    Temp,
    /// Ordering dependency only, nothing is copied
    None,
}

/// Where exported output artifacts come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    /// The component directory
    #[default]
    Component,
    /// The repository root
    RepoRoot,
    /// The step's private temp directory
    Temp,
}

/// Behaviour when a copied file already exists at its destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail the copy
    #[default]
    Error,
    /// Overwrite the existing file
    Replace,
    /// Keep the existing file
    Keep,
}

/// An artifact consumed from an earlier step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Name of the producing step
    pub name: String,

    /// Destination root
    #[serde(default)]
    pub dest: InputDestination,

    /// Path inside the producer's output directory; whole directory when absent
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    /// Path under the destination root
    #[serde(default)]
    pub dest_path: Option<PathBuf>,

    /// Collision policy
    #[serde(default)]
    pub collisions: CollisionPolicy,
}

impl InputSettings {
    /// Input copying the whole output of `name` into `dest`
    pub fn new(name: impl Into<String>, dest: InputDestination) -> Self {
        Self {
            name: name.into(),
            dest,
            source_path: None,
            dest_path: None,
            collisions: CollisionPolicy::Error,
        }
    }

    /// Set the collision policy
    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }

    /// Set the source path
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Set the destination path
    pub fn with_dest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dest_path = Some(path.into());
        self
    }
}

/// An artifact exported into the step's output directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Source root
    #[serde(default)]
    pub source: OutputSource,

    /// Path under the source root
    pub source_path: PathBuf,

    /// Path under the output directory; defaults to `source_path`
    #[serde(default)]
    pub dest_path: Option<PathBuf>,

    /// Collision policy
    #[serde(default)]
    pub collisions: CollisionPolicy,
}

impl OutputSettings {
    /// Export `source_path` from `source`
    pub fn new(source: OutputSource, source_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            source_path: source_path.into(),
            dest_path: None,
            collisions: CollisionPolicy::Error,
        }
    }
}
