//! CLI commands

mod init;
mod perform;
mod plan;
mod prepare;
mod validate;

pub use init::InitCommand;
pub use perform::PerformCommand;
pub use plan::PlanCommand;
pub use prepare::PrepareCommand;
pub use validate::ValidateCommand;

use anyhow::Context;
use tracing::debug;

use gantry_core::component::ComponentRegistry;
use gantry_core::config::{load_config_from_dir, Config};
use gantry_git::GitRepo;
use gantry_release::{ComponentSpec, RequestSpec, VersionHint};

/// Configuration, repository and components of the current directory
pub(crate) struct Workspace {
    pub config: Config,
    pub repo: GitRepo,
    pub components: ComponentRegistry,
}

impl Workspace {
    /// Discover the repository and its configuration from the working directory
    pub fn discover() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_from_dir(&cwd)?;
        let repo = GitRepo::discover(&cwd)
            .with_context(|| format!("{} is not inside a git repository", cwd.display()))?;
        let components = ComponentRegistry::from_config(&config)?;
        debug!(
            config = %config_path.display(),
            components = components.len(),
            "workspace loaded"
        );
        Ok(Self {
            config,
            repo,
            components,
        })
    }

    /// Resolve a release request; no specs means every component with changes
    pub fn resolve(
        &self,
        specs: &[ComponentSpec],
        release_ref: Option<&str>,
    ) -> anyhow::Result<RequestSpec<'_>> {
        let mut request = RequestSpec::new(&self.config, &self.components);
        if let Some(reference) = release_ref {
            request = request.with_release_ref(reference);
        }
        if specs.is_empty() {
            request.add_all(VersionHint::Infer);
        }
        for spec in specs {
            request.add_spec(spec);
        }
        request.resolve_versions(&self.repo)?;
        Ok(request)
    }
}
