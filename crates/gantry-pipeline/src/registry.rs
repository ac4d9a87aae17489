//! Step type registry

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use gantry_core::config::StepSettings;
use gantry_core::error::{PipelineError, Result};

use crate::step::Step;
use crate::steps::{CommandStep, GitTagStep, NoopStep, PublishStep};

/// Builds a step from its settings
pub type StepFactory = Box<dyn Fn(&StepSettings) -> Result<Box<dyn Step>>>;

/// Registry of step types by name
pub struct StepRegistry {
    factories: BTreeMap<String, StepFactory>,
}

impl StepRegistry {
    /// Create a registry with the built-in step types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("noop", NoopStep::boxed);
        registry.register("command", CommandStep::boxed);
        registry.register("publish", PublishStep::boxed);
        registry.register("git_tag", GitTagStep::boxed);
        registry
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a step type, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&StepSettings) -> Result<Box<dyn Step>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Whether a step type is known
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered type names
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the step for a settings entry
    pub fn build(&self, settings: &StepSettings) -> Result<Box<dyn Step>> {
        let factory = self.factories.get(&settings.step_type).ok_or_else(|| {
            PipelineError::UnknownStepType {
                step: settings.name.clone(),
                step_type: settings.step_type.clone(),
            }
        })?;
        factory(settings)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize a step's raw options into its typed options struct
pub fn parse_options<T: DeserializeOwned>(settings: &StepSettings) -> Result<T> {
    let map: serde_json::Map<String, serde_json::Value> = settings
        .options
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
        PipelineError::InvalidOptions {
            step: settings.name.clone(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_builtin_types() {
        let registry = StepRegistry::new();
        assert_eq!(registry.names(), vec!["command", "git_tag", "noop", "publish"]);
        assert!(registry.contains("git_tag"));
    }

    #[test]
    fn test_unknown_type_is_typed_error() {
        let registry = StepRegistry::new();
        let settings = StepSettings::new("deploy", "rocket");
        let err = registry.build(&settings).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown step type 'rocket' for step 'deploy'"
        );
    }

    #[test]
    fn test_parse_options() {
        #[derive(Deserialize)]
        struct Options {
            command: String,
            #[serde(default)]
            retries: u32,
        }

        let settings = StepSettings::new("build", "command")
            .with_option("command", serde_json::json!("make"))
            .with_option("unrelated", serde_json::json!(true));
        let options: Options = parse_options(&settings).unwrap();
        assert_eq!(options.command, "make");
        assert_eq!(options.retries, 0);

        let bad = StepSettings::new("build", "command");
        assert!(parse_options::<Options>(&bad).is_err());
    }
}
