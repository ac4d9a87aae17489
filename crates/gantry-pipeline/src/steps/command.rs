//! Shell command step

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Deserialize;
use tracing::{debug, instrument};

use gantry_core::config::StepSettings;
use gantry_core::error::Result;

use crate::context::StepContext;
use crate::registry::parse_options;
use crate::step::{Step, StepError, StepResult};

use super::expand;

/// Directory a command runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingDir {
    /// The component directory
    #[default]
    Component,
    /// The repository root
    RepoRoot,
    /// The step's output directory
    Output,
    /// The step's scratch directory
    Temp,
}

/// Options for [`CommandStep`]
#[derive(Debug, Clone, Deserialize)]
pub struct CommandOptions {
    /// Shell command; `{name}`, `{version}` and `{tag}` are substituted
    pub command: String,
    /// Run without being requested
    #[serde(default)]
    pub primary: bool,
    /// Where to run
    #[serde(default)]
    pub dir: WorkingDir,
    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Runs a shell command; a non-zero exit fails the step
#[derive(Debug, Clone)]
pub struct CommandStep {
    options: CommandOptions,
}

impl CommandStep {
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

impl Step for CommandStep {
    fn run(&self, ctx: &mut StepContext<'_>) -> StepResult {
        let command = expand(&self.options.command, ctx);
        let dir = working_dir(ctx, self.options.dir)?;
        let output = run_shell(ctx, &command, &dir, &self.options.env)?;
        ctx.success(format!("ran `{}`", command));
        debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "command output");
        Ok(())
    }

    fn primary(&self) -> bool {
        self.options.primary
    }
}

pub(crate) fn working_dir(ctx: &mut StepContext<'_>, dir: WorkingDir) -> Result<PathBuf> {
    match dir {
        WorkingDir::Component => Ok(ctx.component_dir()),
        WorkingDir::RepoRoot => Ok(ctx.repo_root().to_path_buf()),
        WorkingDir::Output => ctx.output_dir(),
        WorkingDir::Temp => ctx.temp_dir(),
    }
}

/// Run a command through the shell; failing to start it or a non-zero exit
/// turns into the step's failure
#[instrument(skip(ctx, dir, env), fields(step = %ctx.step_name(), dir = %dir.display()))]
pub(crate) fn run_shell(
    ctx: &mut StepContext<'_>,
    command: &str,
    dir: &Path,
    env: &BTreeMap<String, String>,
) -> std::result::Result<Output, StepError> {
    let output_dir = ctx.output_dir()?;
    let output = shell(command)
        .current_dir(dir)
        .envs(env)
        .env("GANTRY_COMPONENT", ctx.component().name())
        .env("GANTRY_VERSION", ctx.version().to_string())
        .env("GANTRY_OUTPUT_DIR", &output_dir)
        .env("GANTRY_DRY_RUN", if ctx.dry_run() { "1" } else { "0" })
        .output()
        .map_err(|e| ctx.fail(format!("could not start `{}`: {}", command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(ctx.fail(format!(
            "`{}` exited with {}: {}",
            command,
            code,
            stderr.trim()
        )));
    }
    Ok(output)
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
