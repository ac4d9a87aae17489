//! Prepare command

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use tracing::{info, instrument};

use gantry_changelog::MarkdownFormatter;
use gantry_core::component::ComponentRegistry;
use gantry_release::{ComponentSpec, ResolvedComponent};

use super::plan::print_plan;
use super::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Write changelog entries and version files for a release
#[derive(Debug, Args)]
pub struct PrepareCommand {
    /// Components to release as `name[=version|level]`, or `all`; defaults to `all`
    pub components: Vec<ComponentSpec>,

    /// Git ref to release from instead of the configured one
    #[arg(long = "ref")]
    pub release_ref: Option<String>,

    /// Release date written into changelog headings (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Show the plan without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl PrepareCommand {
    /// Execute the prepare command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            components = self.components.len(),
            dry_run = self.dry_run,
            "executing prepare command"
        );
        let workspace = Workspace::discover()?;
        let request = workspace.resolve(&self.components, self.release_ref.as_deref())?;
        print_plan(&request, cli)?;

        if self.dry_run {
            if cli.format == OutputFormat::Text && !cli.quiet {
                println!();
                output::warning("Dry run: no files written");
            }
            return Ok(());
        }

        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let formatter = MarkdownFormatter::new();
        let root = workspace.repo.path();
        for resolved in request.resolved_components() {
            let written = write_release_files(
                &workspace.components,
                resolved,
                root,
                &formatter,
                date,
            )?;
            if cli.format == OutputFormat::Text && !cli.quiet {
                for path in written {
                    let shown = path.strip_prefix(root).unwrap_or(&path);
                    output::success(&format!(
                        "Updated {}",
                        output::path_style().apply_to(shown.display())
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Prepend the changelog entry and bump the version file of one component
#[instrument(skip_all, fields(component = %resolved.name, version = %resolved.version))]
pub(crate) fn write_release_files(
    components: &ComponentRegistry,
    resolved: &ResolvedComponent,
    root: &Path,
    formatter: &MarkdownFormatter,
    date: NaiveDate,
) -> anyhow::Result<Vec<PathBuf>> {
    let component = components.require(&resolved.name)?;
    let mut written = Vec::new();

    let changelog = component.changelog_file(root);
    let entry = formatter.format_entry(&resolved.change_set, &resolved.version, date);
    changelog.prepend_entry(&entry, &formatter.title)?;
    written.push(changelog.path().to_path_buf());

    if let Some(version_file) = component.version_file(root) {
        version_file.update_version(&resolved.version)?;
        written.push(version_file.path().to_path_buf());
    }
    info!(files = written.len(), "release files written");
    Ok(written)
}
