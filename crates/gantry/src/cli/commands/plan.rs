//! Plan command

use clap::Args;
use console::style;
use tracing::info;

use gantry_changelog::MarkdownFormatter;
use gantry_release::{ComponentSpec, RequestSpec, ResolvedComponent};

use super::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Show which components would be released and at which versions
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Components to release as `name[=version|level]`, or `all`; defaults to `all`
    pub components: Vec<ComponentSpec>,

    /// Git ref to release from instead of the configured one
    #[arg(long = "ref")]
    pub release_ref: Option<String>,
}

impl PlanCommand {
    /// Execute the plan command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            components = self.components.len(),
            release_ref = ?self.release_ref,
            "executing plan command"
        );
        let workspace = Workspace::discover()?;
        let request = workspace.resolve(&self.components, self.release_ref.as_deref())?;
        print_plan(&request, cli)
    }
}

/// Print a resolved request in the chosen format
pub(crate) fn print_plan(request: &RequestSpec<'_>, cli: &Cli) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "release_ref": request.release_ref(),
                "release_sha": request.release_sha(),
                "components": request.resolved_components(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            println!("{}", output::header("Release Plan"));
            println!();
            for resolved in request.resolved_components() {
                print_component(resolved, cli.verbose);
            }
        }
    }
    Ok(())
}

fn print_component(resolved: &ResolvedComponent, verbose: bool) {
    let last = resolved
        .last_version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unreleased".to_string());
    println!(
        "  {} {} → {} {} {}",
        style(&resolved.name).bold(),
        style(last).dim(),
        output::version_style().apply_to(&resolved.version),
        output::tag_style().apply_to(&resolved.tag),
        style(format!("[{}]", resolved.bump_level())).dim()
    );
    if verbose {
        let notes = MarkdownFormatter::new().format_notes(&resolved.change_set);
        for line in notes.lines() {
            println!("      {}", line);
        }
    }
}
