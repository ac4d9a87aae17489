//! Init command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use gantry_core::config::{Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML};

use crate::cli::output;
use crate::cli::Cli;

/// Configuration file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML, with comments
    #[default]
    Yaml,
    /// TOML
    Toml,
}

/// Write a starter configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration format
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, format = ?self.config_format, "executing init command");
        let cwd = std::env::current_dir()?;
        let default_name = match self.config_format {
            ConfigFormat::Yaml => DEFAULT_CONFIG_YAML,
            ConfigFormat::Toml => DEFAULT_CONFIG_TOML,
        };
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(default_name));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, render_config(self.config_format)?)?;

        if !cli.quiet {
            output::success(&format!(
                "Created {}",
                output::path_style().apply_to(config_path.display())
            ));
            output::info("Edit the components section, then run `gantry validate`");
        }
        Ok(())
    }
}

fn render_config(format: ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Yaml => DEFAULT_CONFIG_TEMPLATE.to_string(),
        ConfigFormat::Toml => toml::to_string_pretty(&Config::default())?,
    })
}
