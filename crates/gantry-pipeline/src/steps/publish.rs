//! Package publishing step

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use gantry_core::config::StepSettings;
use gantry_core::error::Result;

use crate::context::StepContext;
use crate::registry::parse_options;
use crate::step::{Step, StepError, StepResult};

use super::command::{run_shell, working_dir, WorkingDir};
use super::expand;

/// Options for [`PublishStep`]
#[derive(Debug, Clone, Deserialize)]
pub struct PublishOptions {
    /// Command that publishes the package
    pub command: String,
    /// Command that succeeds when this version is already published
    #[serde(default)]
    pub check: Option<String>,
    /// Where to run both commands
    #[serde(default)]
    pub dir: WorkingDir,
    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Publishes the component. Always runs; skips the upload in dry run and
/// when the version is already out.
#[derive(Debug, Clone)]
pub struct PublishStep {
    options: PublishOptions,
}

impl PublishStep {
    /// Build from settings
    pub fn from_settings(settings: &StepSettings) -> Result<Self> {
        Ok(Self {
            options: parse_options(settings)?,
        })
    }

    /// Factory for the step registry
    pub fn boxed(settings: &StepSettings) -> Result<Box<dyn Step>> {
        Ok(Box::new(Self::from_settings(settings)?))
    }
}

impl Step for PublishStep {
    fn run(&self, ctx: &mut StepContext<'_>) -> StepResult {
        let dir = working_dir(ctx, self.options.dir)?;
        let label = format!("{} {}", ctx.component().name(), ctx.version());

        if let Some(check) = &self.options.check {
            let check = expand(check, ctx);
            if run_shell(ctx, &check, &dir, &self.options.env).is_ok() {
                info!(check = %check, "version already published");
                ctx.success(format!("{} is already published", label));
                return Err(StepError::Exit(None));
            }
        }

        let command = expand(&self.options.command, ctx);
        if ctx.dry_run() {
            ctx.success(format!("DRY RUN: would publish {} with `{}`", label, command));
            return Ok(());
        }

        run_shell(ctx, &command, &dir, &self.options.env)?;
        ctx.success(format!("published {}", label));
        Ok(())
    }

    fn primary(&self) -> bool {
        true
    }
}
