//! Release tag step

use serde::Deserialize;
use tracing::info;

use gantry_core::config::StepSettings;
use gantry_core::error::Result;

use crate::context::StepContext;
use crate::registry::parse_options;
use crate::step::{Step, StepError, StepResult};

use super::expand;

/// Options for [`GitTagStep`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitTagOptions {
    /// Annotation; `{name}`, `{version}` and `{tag}` are substituted
    pub message: String,
    /// Push the tag after creating it
    pub push: bool,
    /// Remote to push to instead of the configured one
    pub remote: Option<String>,
}

impl Default for GitTagOptions {
    fn default() -> Self {
        Self {
            message: "Release {name} {version}".to_string(),
            push: true,
            remote: None,
        }
    }
}

/// Tags the release commit and pushes the tag
#[derive(Debug, Clone)]
pub struct GitTagStep {
    options: GitTagOptions,
}

impl GitTagStep {
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

impl Step for GitTagStep {
    fn run(&self, ctx: &mut StepContext<'_>) -> StepResult {
        let tag = ctx.target().tag_name();
        let remote = self
            .options
            .remote
            .clone()
            .unwrap_or_else(|| ctx.target().remote.clone());

        if ctx.repo().tag_exists(&tag)? {
            ctx.success(format!("tag {} already exists", tag));
            return Err(StepError::Exit(None));
        }

        if ctx.dry_run() {
            ctx.success(format!("DRY RUN: would create tag {}", tag));
            return Ok(());
        }

        let message = expand(&self.options.message, ctx);
        let sha = ctx.target().sha.clone();
        ctx.repo()
            .create_tag(&tag, &sha, Some(&message))
            .map_err(|e| ctx.fail(e.to_string()))?;
        info!(tag = %tag, sha = %sha, "created release tag");

        if self.options.push {
            ctx.repo()
                .push_tag(&remote, &tag)
                .map_err(|e| ctx.fail(e.to_string()))?;
            ctx.success(format!("created and pushed tag {}", tag));
        } else {
            ctx.success(format!("created tag {}", tag));
        }
        Ok(())
    }

    fn primary(&self) -> bool {
        true
    }
}
