//! Validate command

use std::path::Path;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, warn};

use gantry_core::component::ComponentRegistry;
use gantry_core::config::{load_config_from_dir, Config};
use gantry_git::GitRepo;
use gantry_pipeline::{Pipeline, StepRegistry};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Validate configuration and repository state
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Only validate configuration file
    #[arg(long)]
    pub config_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Default, Serialize)]
struct Findings {
    valid: bool,
    config_path: Option<String>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            config_only = self.config_only,
            strict = self.strict,
            "executing validate command"
        );
        let cwd = std::env::current_dir()?;
        let mut findings = Findings::default();

        let config = match load_config_from_dir(&cwd) {
            Ok((config, path)) => {
                findings.config_path = Some(path.display().to_string());
                check_pipelines(&config, &mut findings);
                Some(config)
            }
            Err(e) => {
                findings.errors.push(format!("Configuration: {}", e));
                None
            }
        };

        if !self.config_only {
            check_repository(&cwd, config.as_ref(), &mut findings);
        }

        if self.strict {
            let warnings = std::mem::take(&mut findings.warnings);
            findings.errors.extend(warnings);
        }
        findings.valid = findings.errors.is_empty();
        if !findings.valid {
            warn!(errors = findings.errors.len(), "validation failed");
        }

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
            OutputFormat::Text if !cli.quiet => print_findings(&findings),
            OutputFormat::Text => {}
        }

        if config.is_none() {
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
        if !findings.valid {
            std::process::exit(exit_codes::ERROR);
        }
        Ok(())
    }
}

/// Every component's pipeline must build and resolve
fn check_pipelines(config: &Config, findings: &mut Findings) {
    let components = match ComponentRegistry::from_config(config) {
        Ok(components) => components,
        Err(e) => {
            findings.errors.push(format!("Components: {}", e));
            return;
        }
    };

    let registry = StepRegistry::new();
    for component in components.iter() {
        let planned = Pipeline::build(component.steps(config), &registry).and_then(|mut pipeline| {
            pipeline.resolve_run()?;
            Ok(pipeline.will_run().len())
        });
        match planned {
            Ok(0) => findings
                .warnings
                .push(format!("Pipeline of {} runs no steps", component.name())),
            Ok(_) => {}
            Err(e) => findings.errors.push(format!("{}: {}", component.name(), e)),
        }
    }
}

fn check_repository(cwd: &Path, config: Option<&Config>, findings: &mut Findings) {
    let repo = match GitRepo::discover(cwd) {
        Ok(repo) => repo,
        Err(e) => {
            findings.errors.push(format!("Git repository: {}", e));
            return;
        }
    };

    match repo.is_clean() {
        Ok(true) => {}
        Ok(false) => findings
            .warnings
            .push("Working directory has uncommitted changes".to_string()),
        Err(e) => findings.errors.push(format!("Git status check: {}", e)),
    }

    let Some(config) = config else {
        return;
    };
    match repo.current_branch() {
        Ok(Some(branch)) if branch == config.git.main_branch => {}
        Ok(Some(branch)) => findings.warnings.push(format!(
            "Not on release branch '{}', currently on '{}'",
            config.git.main_branch, branch
        )),
        Ok(None) => findings.warnings.push("HEAD is detached".to_string()),
        Err(e) => findings.errors.push(format!("Branch check: {}", e)),
    }
    match repo.has_remote(&config.git.remote) {
        Ok(true) => {}
        Ok(false) => findings
            .warnings
            .push(format!("Remote '{}' not found", config.git.remote)),
        Err(e) => findings.errors.push(format!("Remote check: {}", e)),
    }
}

fn print_findings(findings: &Findings) {
    println!("{}", output::header("Validation Results"));
    println!();
    if let Some(path) = &findings.config_path {
        println!("Config: {}", output::path_style().apply_to(path));
        println!();
    }
    for error in &findings.errors {
        output::error(error);
    }
    for warning in &findings.warnings {
        output::warning(warning);
    }
    if findings.valid {
        output::success("All checks passed");
    } else {
        println!(
            "{} with {} error(s)",
            style("Validation failed").red().bold(),
            findings.errors.len()
        );
    }
}
