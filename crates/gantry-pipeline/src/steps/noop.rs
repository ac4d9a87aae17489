//! Step that does nothing

use serde::Deserialize;

use gantry_core::config::StepSettings;
use gantry_core::error::Result;

use crate::context::StepContext;
use crate::registry::parse_options;
use crate::step::{Step, StepResult};

/// Options for [`NoopStep`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoopOptions {
    /// Run without being requested
    pub primary: bool,
    /// Earlier steps to pull in
    pub depends_on: Vec<String>,
}

/// Placeholder step, useful to group dependencies under one name
#[derive(Debug, Clone)]
pub struct NoopStep {
    options: NoopOptions,
}

impl NoopStep {
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

impl Step for NoopStep {
    fn run(&self, ctx: &mut StepContext<'_>) -> StepResult {
        let message = format!("step {} has nothing to do", ctx.step_name());
        ctx.success(message);
        Ok(())
    }

    fn primary(&self) -> bool {
        self.options.primary
    }

    fn dependencies(&self) -> Vec<String> {
        self.options.depends_on.clone()
    }
}
