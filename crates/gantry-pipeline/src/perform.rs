//! Performing a component release

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use gantry_core::component::Component;
use gantry_core::config::Config;
use gantry_core::error::{GantryError, Result};
use gantry_core::types::ReleaseReport;
use gantry_core::version::Version;
use gantry_git::ReleaseRepository;

use crate::artifact::ArtifactDir;
use crate::context::ReleaseTarget;
use crate::pipeline::{Pipeline, RunOutcome};
use crate::registry::StepRegistry;
use crate::reporter::PipelineReporter;

/// Runs the release pipeline of a component whose release has been
/// prepared: changelog and version file already name the new version
pub struct ReleasePerformer<'a> {
    config: &'a Config,
    registry: &'a StepRegistry,
    repo: &'a dyn ReleaseRepository,
    dry_run: bool,
    artifacts_base: Option<PathBuf>,
    reporters: Vec<Arc<dyn PipelineReporter>>,
}

impl<'a> ReleasePerformer<'a> {
    /// Create a performer
    pub fn new(
        config: &'a Config,
        registry: &'a StepRegistry,
        repo: &'a dyn ReleaseRepository,
    ) -> Self {
        Self {
            config,
            registry,
            repo,
            dry_run: false,
            artifacts_base: None,
            reporters: Vec::new(),
        }
    }

    /// Skip externally irreversible actions
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Keep artifacts under this directory instead of a temporary one
    pub fn with_artifacts_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.artifacts_base = Some(base.into());
        self
    }

    /// Add a pipeline reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn PipelineReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Version to release: the requested one, checked against the version
    /// file and changelog, or whatever those files name
    fn release_version(
        &self,
        component: &Component,
        requested: Option<&Version>,
        report: &mut ReleaseReport,
    ) -> Result<Option<Version>> {
        let root = self.repo.root();
        let file_version = match component.version_file(root) {
            Some(file) if file.exists() => Some(file.read_version()?),
            _ => None,
        };
        let changelog = component.changelog_file(root);
        let changelog_version = if changelog.exists() {
            changelog.current_version()?
        } else {
            None
        };

        let Some(version) = requested
            .cloned()
            .or_else(|| file_version.clone())
            .or_else(|| changelog_version.clone())
        else {
            return Err(GantryError::other(format!(
                "Cannot determine the version of {} to release",
                component.name()
            )));
        };

        let mut consistent = true;
        for (source, found) in [
            ("version file", file_version),
            ("changelog", changelog_version),
        ] {
            if let Some(found) = found {
                if found != version {
                    report.add_error(format!(
                        "{}: {} says {} but {} is being released",
                        component.name(),
                        source,
                        found,
                        version
                    ));
                    consistent = false;
                }
            }
        }
        Ok(consistent.then_some(version))
    }

    /// Run the component's pipeline and report what happened
    #[instrument(skip(self, component), fields(component = %component.name(), dry_run = self.dry_run))]
    pub fn perform(
        &self,
        component: &Component,
        requested: Option<&Version>,
    ) -> Result<ReleaseReport> {
        let mut report = ReleaseReport::new();
        let Some(version) = self.release_version(component, requested, &mut report)? else {
            return Ok(report);
        };

        let sha = self.repo.current_sha(&self.config.git.release_ref)?;
        let target = ReleaseTarget {
            component,
            version,
            sha,
            repo: self.repo,
            remote: self.config.git.remote.clone(),
            dry_run: self.dry_run,
        };
        info!(version = %target.version, sha = %target.sha, "performing release");

        let mut pipeline = Pipeline::build(component.steps(self.config), self.registry)?;
        for reporter in &self.reporters {
            pipeline = pipeline.with_reporter(Arc::clone(reporter));
        }
        pipeline.resolve_run()?;

        let mut artifacts = match &self.artifacts_base {
            Some(base) => ArtifactDir::with_base(base),
            None => ArtifactDir::new(),
        };
        let outcome = pipeline.run(&target, &mut artifacts, &mut report);
        if let Err(err) = artifacts.cleanup() {
            warn!(error = %err, "failed to remove artifacts");
        }

        match outcome? {
            RunOutcome::Completed => info!(ok = report.is_ok(), "release pipeline finished"),
            RunOutcome::Aborted { step } => warn!(step = %step, "release pipeline aborted"),
        }
        Ok(report)
    }
}
