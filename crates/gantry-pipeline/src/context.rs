//! What a running step can see and do

use std::path::{Path, PathBuf};

use gantry_core::component::Component;
use gantry_core::config::StepSettings;
use gantry_core::error::Result;
use gantry_core::types::ReleaseReport;
use gantry_core::version::Version;
use gantry_git::ReleaseRepository;

use crate::artifact::ArtifactDir;
use crate::step::StepError;

/// The release a pipeline works on
pub struct ReleaseTarget<'a> {
    /// Component being released
    pub component: &'a Component,
    /// Version being released
    pub version: Version,
    /// Commit the release is cut from
    pub sha: String,
    /// Repository collaborator
    pub repo: &'a dyn ReleaseRepository,
    /// Remote to push to
    pub remote: String,
    /// Skip externally irreversible actions
    pub dry_run: bool,
}

impl ReleaseTarget<'_> {
    /// Tag the release gets
    pub fn tag_name(&self) -> String {
        self.component.tag_name(&self.version)
    }

    /// Component directory in the working tree
    pub fn component_dir(&self) -> PathBuf {
        self.component.path_in(self.repo.root())
    }
}

/// Context handed to [`Step::run`](crate::Step::run)
pub struct StepContext<'a> {
    target: &'a ReleaseTarget<'a>,
    settings: &'a StepSettings,
    artifacts: &'a mut ArtifactDir,
    report: &'a mut ReleaseReport,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        target: &'a ReleaseTarget<'a>,
        settings: &'a StepSettings,
        artifacts: &'a mut ArtifactDir,
        report: &'a mut ReleaseReport,
    ) -> Self {
        Self {
            target,
            settings,
            artifacts,
            report,
        }
    }

    /// Release being performed
    pub fn target(&self) -> &ReleaseTarget<'a> {
        self.target
    }

    /// Component being released
    pub fn component(&self) -> &Component {
        self.target.component
    }

    /// Version being released
    pub fn version(&self) -> &Version {
        &self.target.version
    }

    /// Whether externally irreversible actions should be skipped
    pub fn dry_run(&self) -> bool {
        self.target.dry_run
    }

    /// Repository collaborator
    pub fn repo(&self) -> &dyn ReleaseRepository {
        self.target.repo
    }

    /// Repository root
    pub fn repo_root(&self) -> &Path {
        self.target.repo.root()
    }

    /// Component directory
    pub fn component_dir(&self) -> PathBuf {
        self.target.component_dir()
    }

    /// Name of the running step
    pub fn step_name(&self) -> &str {
        &self.settings.name
    }

    /// This step's output directory
    pub fn output_dir(&mut self) -> Result<PathBuf> {
        self.artifacts.output(&self.settings.name)
    }

    /// This step's private scratch directory
    pub fn temp_dir(&mut self) -> Result<PathBuf> {
        self.artifacts.temp(&self.settings.name)
    }

    /// Record a success in the release report
    pub fn success(&mut self, message: impl AsRef<str>) {
        let message = format!("{}: {}", self.target.component.name(), message.as_ref());
        tracing::info!(step = %self.settings.name, "{}", message);
        self.report.add_success(message);
    }

    /// Turn a failure into the exit this step is configured for: a local
    /// exit, or a pipeline abort with `abort_pipeline_on_error`
    pub fn fail(&self, message: impl AsRef<str>) -> StepError {
        step_failure(self.target.component.name(), self.settings, message.as_ref())
    }
}

/// Failure of a step, shaped by its `abort_pipeline_on_error` setting
pub(crate) fn step_failure(component: &str, settings: &StepSettings, message: &str) -> StepError {
    let message = format!("{}: step {} failed: {}", component, settings.name, message);
    if settings.abort_pipeline_on_error {
        StepError::Abort(message)
    } else {
        StepError::Exit(Some(message))
    }
}
