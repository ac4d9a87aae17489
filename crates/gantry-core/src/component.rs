//! Releasable components and their coordination groups

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::{ComponentConfig, Config, DependencyUpdateConfig, StepSettings};
use crate::error::{ConfigError, Result};
use crate::files::{ChangelogFile, VersionFile};
use crate::semver::Semver;
use crate::version::Version;

/// A releasable unit of the repository
#[derive(Debug, Clone)]
pub struct Component {
    config: ComponentConfig,
    coordination_group: Vec<String>,
    include: GlobSet,
    exclude: GlobSet,
}

impl Component {
    /// Build a component from its configuration.
    ///
    /// `coordination_group` lists every member of the component's group,
    /// including itself; pass `None` for an uncoordinated component.
    pub fn new(config: ComponentConfig, coordination_group: Option<Vec<String>>) -> Result<Self> {
        let coordination_group = coordination_group.unwrap_or_else(|| vec![config.name.clone()]);
        let include = build_globset(&config.name, &config.include_paths)?;
        let exclude = build_globset(&config.name, &config.exclude_paths)?;
        Ok(Self {
            config,
            coordination_group,
            include,
            exclude,
        })
    }

    /// Component name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Directory relative to the repository root
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Raw configuration
    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Names of the components that release together with this one
    pub fn coordination_group(&self) -> &[String] {
        &self.coordination_group
    }

    /// Whether this component shares its releases with others
    pub fn is_coordinated(&self) -> bool {
        self.coordination_group.len() > 1
    }

    /// Dependency-triggered release settings
    pub fn dependency_update(&self) -> Option<&DependencyUpdateConfig> {
        self.config.update_dependencies.as_ref()
    }

    /// Tag name for a released version
    pub fn tag_name(&self, version: &Version) -> String {
        self.config
            .tag_format
            .replace("{name}", &self.config.name)
            .replace("{version}", &version.to_string())
    }

    /// Tag format string
    pub fn tag_format(&self) -> &str {
        &self.config.tag_format
    }

    /// Whether a repository-relative path belongs to this component.
    ///
    /// Paths under the component directory count unless excluded; other
    /// paths count only if an include glob matches them.
    pub fn matches_path(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        let directory = self.directory();
        let in_directory = directory == Path::new(".")
            || directory.as_os_str().is_empty()
            || path.starts_with(directory);
        in_directory || self.include.is_match(path)
    }

    /// Whether any of the paths belongs to this component
    pub fn touched_by<P: AsRef<Path>>(&self, paths: &[P]) -> bool {
        paths.iter().any(|p| self.matches_path(p.as_ref()))
    }

    /// Component directory under a repository root
    pub fn path_in(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(self.directory())
    }

    /// Changelog accessor
    pub fn changelog_file(&self, repo_root: &Path) -> ChangelogFile {
        ChangelogFile::new(self.path_in(repo_root).join(&self.config.changelog_path))
    }

    /// Version constant accessor, if the component declares a version file
    pub fn version_file(&self, repo_root: &Path) -> Option<VersionFile> {
        self.config
            .version_file
            .as_ref()
            .map(|path| VersionFile::new(self.path_in(repo_root).join(path)))
    }

    /// Pipeline steps, falling back to the repository-wide pipeline
    pub fn steps<'a>(&'a self, config: &'a Config) -> &'a [StepSettings] {
        self.config.steps.as_deref().unwrap_or(&config.steps)
    }
}

fn build_globset(component: &str, patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
            field: format!("components.{}.paths", component),
            message: format!("invalid glob '{}': {}", pattern, e),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        ConfigError::InvalidValue {
            field: format!("components.{}.paths", component),
            message: e.to_string(),
        }
        .into()
    })
}

/// Version constraint a dependent publishes on a dependency at `version`.
///
/// The constraint floats across changes below the next level above `level`:
/// `minor` on `1.2.3` gives `>= 1.2.3, < 2.0.0`, and `major` leaves it
/// unbounded. `none` pins the exact version.
pub fn pessimistic_constraint(version: &Version, level: Semver) -> String {
    let ceiling = match level {
        Semver::Major => return format!(">= {}", version),
        Semver::Minor => Semver::Major,
        Semver::Patch => Semver::Minor,
        Semver::Patch2 => Semver::Patch,
        Semver::None => return format!("= {}", version),
    };
    format!(">= {}, < {}", version, ceiling.bump(Some(version)))
}

/// All configured components, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Build the registry from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::default();
        for component_config in &config.components {
            let group = config
                .coordination_groups
                .iter()
                .find(|g| g.contains(&component_config.name))
                .cloned();
            registry.register(Component::new(component_config.clone(), group)?);
        }
        debug!(count = registry.components.len(), "component registry built");
        Ok(registry)
    }

    /// Register a component
    pub fn register(&mut self, component: Component) {
        self.index
            .insert(component.name().to_string(), self.components.len());
        self.components.push(component);
    }

    /// Look up a component by name
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    /// Look up a component, failing on unknown names
    pub fn require(&self, name: &str) -> Result<&Component> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownComponent(name.to_string()).into())
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Component names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(Component::name).collect()
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether there are no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
