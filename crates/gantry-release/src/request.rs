//! Release request resolution

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use gantry_changelog::ChangeSet;
use gantry_core::component::{pessimistic_constraint, Component, ComponentRegistry};
use gantry_core::config::Config;
use gantry_core::error::{ResolutionError, Result};
use gantry_core::semver::Semver;
use gantry_core::version::Version;
use gantry_git::{CommitInfo, ReleaseRepository, TagPattern};

use crate::hint::{ComponentSpec, VersionHint};

/// A component with its decided release
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedComponent {
    /// Component name
    pub name: String,
    /// Finished changes since the last release
    pub change_set: ChangeSet,
    /// Last released version, `None` before the first release
    pub last_version: Option<Version>,
    /// Commit the last release tag points to
    pub last_sha: Option<String>,
    /// Version to release
    pub version: Version,
    /// Tag the release will get
    pub tag: String,
    /// Hint the version was resolved from
    pub hint: VersionHint,
}

impl ResolvedComponent {
    /// Significance of the bump from the last release
    pub fn bump_level(&self) -> Semver {
        match &self.last_version {
            Some(last) => Semver::for_diff(last, &self.version),
            None => Semver::Major,
        }
    }
}

/// History of one component since its last release
#[derive(Debug, Clone)]
struct Analysis {
    last: Option<(Version, String)>,
    commits: Vec<CommitInfo>,
}

impl Analysis {
    fn last_version(&self) -> Option<&Version> {
        self.last.as_ref().map(|(v, _)| v)
    }
}

/// A release request and, once resolved, its version plan.
///
/// Problems found while resolving are collected and returned together as a
/// single [`ResolutionError`].
pub struct RequestSpec<'a> {
    config: &'a Config,
    components: &'a ComponentRegistry,
    requested: Vec<(String, VersionHint)>,
    all: Option<VersionHint>,
    release_ref: String,
    release_sha: Option<String>,
    resolved: Vec<ResolvedComponent>,
    problems: Vec<String>,
}

impl<'a> RequestSpec<'a> {
    /// Create an empty request anchored at the configured release ref
    pub fn new(config: &'a Config, components: &'a ComponentRegistry) -> Self {
        Self {
            config,
            components,
            requested: Vec::new(),
            all: None,
            release_ref: config.git.release_ref.clone(),
            release_sha: None,
            resolved: Vec::new(),
            problems: Vec::new(),
        }
    }

    /// Anchor the release at another ref
    pub fn with_release_ref(mut self, reference: impl Into<String>) -> Self {
        self.release_ref = reference.into();
        self
    }

    /// Request a component
    pub fn add(&mut self, name: &str, hint: VersionHint) -> &mut Self {
        if self.components.get(name).is_none() {
            self.problems.push(format!("Unknown component: {}", name));
        } else {
            self.requested.push((name.to_string(), hint));
        }
        self
    }

    /// Request every component that has releasable changes
    pub fn add_all(&mut self, hint: VersionHint) -> &mut Self {
        match self.all.as_ref().map(|existing| existing.merge(&hint)) {
            Some(None) => self.problems.push(format!(
                "Conflicting versions requested for all: {} and {}",
                self.all.as_ref().map(ToString::to_string).unwrap_or_default(),
                hint
            )),
            Some(Some(merged)) => self.all = Some(merged),
            None => self.all = Some(hint),
        }
        self
    }

    /// Request a parsed `name[=version]` item
    pub fn add_spec(&mut self, spec: &ComponentSpec) -> &mut Self {
        if spec.is_all() {
            self.add_all(spec.hint.clone())
        } else {
            self.add(&spec.name, spec.hint.clone())
        }
    }

    /// Ref the release is anchored at
    pub fn release_ref(&self) -> &str {
        &self.release_ref
    }

    /// Sha the release is anchored at, once resolved
    pub fn release_sha(&self) -> Option<&str> {
        self.release_sha.as_deref()
    }

    /// Resolved components in declaration order
    pub fn resolved_components(&self) -> &[ResolvedComponent] {
        &self.resolved
    }

    /// Look up a resolved component
    pub fn resolved(&self, name: &str) -> Option<&ResolvedComponent> {
        self.resolved.iter().find(|r| r.name == name)
    }

    /// Resolve every requested component to a target version
    #[instrument(skip(self, repo), fields(release_ref = %self.release_ref))]
    pub fn resolve_versions(&mut self, repo: &dyn ReleaseRepository) -> Result<()> {
        let release_sha = repo.current_sha(&self.release_ref)?;
        info!(sha = %release_sha, "resolving release request");
        self.release_sha = Some(release_sha.clone());

        let mut resolver = Resolver {
            config: self.config,
            components: self.components,
            repo,
            release_sha,
            analyses: HashMap::new(),
            problems: std::mem::take(&mut self.problems),
        };

        let groups = resolver.expand_groups(&self.requested, self.all.as_ref())?;
        let mut resolved: BTreeMap<usize, ResolvedComponent> = BTreeMap::new();
        for (members, hint) in groups {
            for component in resolver.resolve_group(&members, &hint)? {
                let index = resolver.index_of(&component.name);
                resolved.insert(index, component);
            }
        }
        resolver.cascade(&mut resolved)?;

        if resolved.is_empty() && resolver.problems.is_empty() {
            resolver.problems.push("No components to release".to_string());
        }

        let problems = std::mem::take(&mut resolver.problems);
        self.resolved = resolved.into_values().collect();
        if !problems.is_empty() {
            warn!(count = problems.len(), "release request has problems");
            self.problems = problems.clone();
            return Err(ResolutionError::new(problems).into());
        }

        for component in &self.resolved {
            info!(
                component = %component.name,
                from = ?component.last_version.as_ref().map(ToString::to_string),
                to = %component.version,
                semver = %component.change_set.semver(),
                "resolved release"
            );
        }
        Ok(())
    }
}

struct Resolver<'a, 'r> {
    config: &'a Config,
    components: &'a ComponentRegistry,
    repo: &'r dyn ReleaseRepository,
    release_sha: String,
    analyses: HashMap<String, Analysis>,
    problems: Vec<String>,
}

impl Resolver<'_, '_> {
    fn index_of(&self, name: &str) -> usize {
        self.components
            .iter()
            .position(|c| c.name() == name)
            .unwrap_or(usize::MAX)
    }

    fn component(&self, name: &str) -> Result<&Component> {
        self.components.require(name)
    }

    fn analyze(&mut self, name: &str) -> Result<Analysis> {
        if let Some(analysis) = self.analyses.get(name) {
            return Ok(analysis.clone());
        }

        let component = self.component(name)?;
        let pattern = TagPattern::new(component.tag_format(), component.name());
        let last = self.repo.latest_tag_version(&pattern, &self.release_sha)?;
        let from = last.as_ref().map(|(_, sha)| sha.as_str());
        let commits: Vec<CommitInfo> = self
            .repo
            .commit_info_sequence(from, &self.release_sha)?
            .into_iter()
            .filter(|c| component.touched_by(&c.modified_paths))
            .collect();

        debug!(
            component = name,
            last = ?last.as_ref().map(|(v, _)| v.to_string()),
            commits = commits.len(),
            "analyzed component history"
        );
        let analysis = Analysis { last, commits };
        self.analyses.insert(name.to_string(), analysis.clone());
        Ok(analysis)
    }

    fn change_set(&self, analysis: &Analysis, extra: &[(String, Version, Semver)]) -> ChangeSet {
        let mut change_set = ChangeSet::new(&self.config.changelog);
        for commit in &analysis.commits {
            change_set.add_commit(commit);
        }
        for (dependency, version, constraint_level) in extra {
            change_set.add_change(
                &self.config.changelog.dependency_update_header,
                &format!(
                    "Updated dependency {} to {}",
                    dependency,
                    pessimistic_constraint(version, *constraint_level)
                ),
                Semver::Patch,
            );
        }
        change_set.finish();
        change_set
    }

    /// Pull in coordination groups and merge their hints
    fn expand_groups(
        &mut self,
        requested: &[(String, VersionHint)],
        all: Option<&VersionHint>,
    ) -> Result<Vec<(Vec<String>, VersionHint)>> {
        let mut groups: Vec<(Vec<String>, VersionHint)> = Vec::new();
        let mut conflicted: Vec<usize> = Vec::new();

        let mut selections: Vec<(String, VersionHint)> = requested.to_vec();
        if let Some(hint) = all {
            let names: Vec<String> = self.components.names().iter().map(|n| n.to_string()).collect();
            for name in names {
                let analysis = self.analyze(&name)?;
                if self.change_set(&analysis, &[]).semver().is_significant() {
                    selections.push((name, hint.clone()));
                }
            }
        }

        for (name, hint) in selections {
            let group = self.component(&name)?.coordination_group().to_vec();
            match groups.iter().position(|(members, _)| members.contains(&name)) {
                Some(i) => match groups[i].1.merge(&hint) {
                    Some(merged) => groups[i].1 = merged,
                    None => {
                        if !conflicted.contains(&i) {
                            self.problems.push(format!(
                                "Conflicting versions requested for coordination group [{}]: {} and {}",
                                groups[i].0.join(", "),
                                groups[i].1,
                                hint
                            ));
                            conflicted.push(i);
                        }
                    }
                },
                None => groups.push((group, hint)),
            }
        }

        Ok(groups
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !conflicted.contains(i))
            .map(|(_, g)| g)
            .collect())
    }

    /// Report a version that would not move past the released one
    fn require_newer(&mut self, name: &str, version: &Version, last: Option<&Version>) {
        let Some(last) = last else {
            return;
        };
        if version > last {
            return;
        }
        let problem = format!(
            "Requested version {} of {} is not greater than released version {}",
            version, name, last
        );
        if !self.problems.contains(&problem) {
            self.problems.push(problem);
        }
    }

    /// Decide one version for every member of a group
    fn resolve_group(
        &mut self,
        members: &[String],
        hint: &VersionHint,
    ) -> Result<Vec<ResolvedComponent>> {
        let mut analyzed = Vec::new();
        for name in members {
            let analysis = self.analyze(name)?;
            let mut change_set = self.change_set(&analysis, &[]);
            if !change_set.semver().is_significant() {
                change_set.force_release();
            }
            analyzed.push((name.clone(), analysis, change_set));
        }

        let version = match hint {
            VersionHint::Exact(version) => version.clone(),
            VersionHint::Level(level) => analyzed
                .iter()
                .map(|(_, analysis, _)| level.bump(analysis.last_version()))
                .max()
                .unwrap_or_else(|| level.bump(None)),
            VersionHint::Infer => {
                let level = analyzed
                    .iter()
                    .map(|(_, _, cs)| cs.semver())
                    .max()
                    .filter(Semver::is_significant)
                    .unwrap_or(Semver::Patch);
                analyzed
                    .iter()
                    .map(|(_, analysis, _)| level.bump(analysis.last_version()))
                    .max()
                    .unwrap_or_else(|| level.bump(None))
            }
        };

        for (name, analysis, _) in &analyzed {
            self.require_newer(name, &version, analysis.last_version());
        }

        debug!(group = ?members, version = %version, hint = %hint, "resolved group");
        analyzed
            .into_iter()
            .map(|(name, analysis, change_set)| {
                let tag = self.component(&name)?.tag_name(&version);
                let (last_version, last_sha) = match analysis.last {
                    Some((v, sha)) => (Some(v), Some(sha)),
                    None => (None, None),
                };
                Ok(ResolvedComponent {
                    name,
                    change_set,
                    last_version,
                    last_sha,
                    version: version.clone(),
                    tag,
                    hint: hint.clone(),
                })
            })
            .collect()
    }

    /// Pull dependency-triggered components into the plan until nothing
    /// changes, so chains of dependents cascade regardless of order
    fn cascade(&mut self, resolved: &mut BTreeMap<usize, ResolvedComponent>) -> Result<()> {
        let mut applied: HashMap<String, Vec<(String, Version)>> = HashMap::new();
        let limit = self.components.len() * self.components.len() + 1;

        for round in 0.. {
            if round > limit {
                self.problems
                    .push("Dependency updates did not settle; check for cycles".to_string());
                return Ok(());
            }

            let mut changed = false;
            let components: Vec<Component> = self.components.iter().cloned().collect();
            for component in &components {
                let Some(update) = component.dependency_update() else {
                    continue;
                };

                let triggers: Vec<(String, Version)> = update
                    .dependencies
                    .iter()
                    .filter_map(|dep| resolved.values().find(|r| &r.name == dep))
                    .filter(|dep| dep.bump_level() >= update.dependency_semver_threshold)
                    .map(|dep| (dep.name.clone(), dep.version.clone()))
                    .collect();
                if triggers.is_empty() {
                    continue;
                }
                if applied.get(component.name()) == Some(&triggers) {
                    continue;
                }

                let index = self.index_of(component.name());
                let hint = resolved
                    .get(&index)
                    .map(|r| r.hint.clone())
                    .unwrap_or_default();
                let analysis = self.analyze(component.name())?;
                let extra: Vec<(String, Version, Semver)> = triggers
                    .iter()
                    .map(|(name, version)| {
                        (name.clone(), version.clone(), update.pessimistic_constraint_level)
                    })
                    .collect();
                let change_set = self.change_set(&analysis, &extra);
                let last = analysis.last_version();

                let version = match &hint {
                    VersionHint::Exact(version) => version.clone(),
                    VersionHint::Level(level) => level.bump(last),
                    VersionHint::Infer => change_set
                        .suggested_version(last)
                        .unwrap_or_else(|| Semver::Patch.bump(last)),
                };
                self.require_newer(component.name(), &version, last);

                info!(
                    component = %component.name(),
                    triggers = ?triggers.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
                    version = %version,
                    "dependency-triggered release"
                );
                let (last_version, last_sha) = match analysis.last {
                    Some((v, sha)) => (Some(v), Some(sha)),
                    None => (None, None),
                };
                resolved.insert(
                    index,
                    ResolvedComponent {
                        name: component.name().to_string(),
                        change_set,
                        last_version,
                        last_sha,
                        tag: component.tag_name(&version),
                        version,
                        hint,
                    },
                );
                applied.insert(component.name().to_string(), triggers);
                changed = true;
            }

            if !changed {
                break;
            }
        }
        Ok(())
    }
}
