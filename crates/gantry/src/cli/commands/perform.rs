//! Perform command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gantry_core::version::Version;
use gantry_pipeline::{ReleasePerformer, StepRegistry};

use super::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Run the release pipeline of a prepared component
#[derive(Debug, Args)]
#[command(disable_version_flag = true)]
pub struct PerformCommand {
    /// Component to release
    pub component: String,

    /// Version being released; must match the version file and changelog
    #[arg(long)]
    pub version: Option<Version>,

    /// Run the pipeline without tagging, pushing or publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Keep step artifacts in this directory instead of a temporary one
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,
}

impl PerformCommand {
    /// Execute the perform command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            component = %self.component,
            version = ?self.version,
            dry_run = self.dry_run,
            "executing perform command"
        );
        let workspace = Workspace::discover()?;
        let component = workspace.components.require(&self.component)?;

        let registry = StepRegistry::new();
        let mut performer = ReleasePerformer::new(&workspace.config, &registry, &workspace.repo)
            .with_dry_run(self.dry_run);
        if let Some(dir) = &self.artifacts_dir {
            performer = performer.with_artifacts_base(dir);
        }

        if self.dry_run && cli.format == OutputFormat::Text && !cli.quiet {
            println!(
                "  {}",
                style("[DRY RUN - nothing will be tagged or published]")
                    .yellow()
                    .bold()
            );
            println!();
        }

        let report = performer.perform(component, self.version.as_ref())?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "component": component.name(),
                    "dry_run": self.dry_run,
                    "ok": report.is_ok(),
                    "successes": report.successes,
                    "errors": report.errors,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    output::report(&report);
                } else {
                    for line in &report.errors {
                        output::error(line);
                    }
                }
            }
        }

        if !report.is_ok() {
            std::process::exit(exit_codes::RELEASE_FAILED);
        }
        Ok(())
    }
}
