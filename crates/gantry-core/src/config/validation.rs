//! Configuration validation

use std::collections::HashSet;

use globset::Glob;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{Config, IssueNumberSuffix, StepSettings};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    validate_components(config)?;
    validate_coordination_groups(config)?;
    validate_dependency_updates(config)?;
    validate_steps("steps", &config.steps)?;
    for component in &config.components {
        if let Some(steps) = &component.steps {
            validate_steps(&format!("components.{}.steps", component.name), steps)?;
        }
    }
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::error::GantryError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_changelog(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, tag) in config.changelog.commit_tags.iter().enumerate() {
        if tag.tag.is_empty() {
            return Err(invalid(
                format!("changelog.commit_tags[{}].tag", i),
                "tag cannot be empty",
            ));
        }
        if !seen.insert(tag.tag.as_str()) {
            return Err(invalid(
                format!("changelog.commit_tags[{}].tag", i),
                format!("duplicate tag '{}'", tag.tag),
            ));
        }
    }

    if config.changelog.issue_number_suffix == IssueNumberSuffix::Link
        && config.changelog.repo.is_none()
    {
        return Err(invalid(
            "changelog.issue_number_suffix",
            "linking issue numbers requires changelog.repo",
        ));
    }

    Ok(())
}

fn validate_components(config: &Config) -> Result<()> {
    if !config.components.is_empty() {
        debug!(count = config.components.len(), "validating components");
    }
    let mut names = HashSet::new();
    for (i, component) in config.components.iter().enumerate() {
        if component.name.is_empty() {
            return Err(invalid(
                format!("components[{}].name", i),
                "component name cannot be empty",
            ));
        }
        if !names.insert(component.name.as_str()) {
            return Err(invalid(
                format!("components[{}].name", i),
                format!("duplicate component '{}'", component.name),
            ));
        }
        if !component.tag_format.contains("{version}") {
            return Err(invalid(
                format!("components[{}].tag_format", i),
                "must contain {version} placeholder",
            ));
        }
        for pattern in component.include_paths.iter().chain(&component.exclude_paths) {
            if let Err(e) = Glob::new(pattern) {
                return Err(invalid(
                    format!("components[{}].paths", i),
                    format!("invalid glob '{}': {}", pattern, e),
                ));
            }
        }
    }
    Ok(())
}

fn validate_coordination_groups(config: &Config) -> Result<()> {
    let mut grouped = HashSet::new();
    for (i, group) in config.coordination_groups.iter().enumerate() {
        for name in group {
            if config.component(name).is_none() {
                return Err(ConfigError::UnknownComponent(name.clone()).into());
            }
            if !grouped.insert(name.as_str()) {
                return Err(invalid(
                    format!("coordination_groups[{}]", i),
                    format!("component '{}' belongs to more than one group", name),
                ));
            }
        }
    }
    Ok(())
}

fn validate_dependency_updates(config: &Config) -> Result<()> {
    let coordinated: HashSet<&str> = config
        .coordination_groups
        .iter()
        .filter(|g| g.len() > 1)
        .flatten()
        .map(String::as_str)
        .collect();

    for component in &config.components {
        let Some(update) = &component.update_dependencies else {
            continue;
        };
        let field = format!("components.{}.update_dependencies", component.name);
        if coordinated.contains(component.name.as_str()) {
            return Err(invalid(
                field,
                "a coordinated component cannot also be dependency-triggered",
            ));
        }
        for dependency in &update.dependencies {
            if dependency == &component.name {
                return Err(invalid(field, "a component cannot depend on itself"));
            }
            if config.component(dependency).is_none() {
                return Err(ConfigError::UnknownComponent(dependency.clone()).into());
            }
        }
    }
    Ok(())
}

fn validate_steps(field: &str, steps: &[StepSettings]) -> Result<()> {
    let mut names = HashSet::new();
    for (i, step) in steps.iter().enumerate() {
        if step.name.is_empty() {
            return Err(invalid(format!("{}[{}].name", field, i), "step name cannot be empty"));
        }
        if step.step_type.is_empty() {
            return Err(invalid(format!("{}[{}].type", field, i), "step type cannot be empty"));
        }
        if !names.insert(step.name.as_str()) {
            return Err(invalid(
                format!("{}[{}].name", field, i),
                format!("duplicate step '{}'", step.name),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentConfig, DependencyUpdateConfig};
    use crate::semver::Semver;

    fn config_with(names: &[&str]) -> Config {
        Config {
            components: names
                .iter()
                .map(|n| ComponentConfig::new(*n, *n))
                .collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_invalid_tag_format() {
        let mut config = config_with(&["core"]);
        config.components[0].tag_format = "no-placeholder".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_component_in_two_groups_is_rejected() {
        let mut config = config_with(&["a", "b", "c"]);
        config.coordination_groups = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string(), "c".to_string()],
        ];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("more than one group"));
    }

    #[test]
    fn test_group_with_unknown_component_is_rejected() {
        let mut config = config_with(&["a"]);
        config.coordination_groups = vec![vec!["a".to_string(), "ghost".to_string()]];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_coordinated_component_cannot_be_dependency_triggered() {
        let mut config = config_with(&["a", "b", "c"]);
        config.coordination_groups = vec![vec!["a".to_string(), "b".to_string()]];
        config.components[0].update_dependencies = Some(DependencyUpdateConfig {
            dependencies: vec!["c".to_string()],
            dependency_semver_threshold: Semver::Minor,
            pessimistic_constraint_level: Semver::Minor,
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("dependency-triggered"));
    }

    #[test]
    fn test_duplicate_step_names_are_rejected() {
        let mut config = config_with(&["a"]);
        config.steps = vec![
            StepSettings::new("build", "command"),
            StepSettings::new("build", "noop"),
        ];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_link_suffix_requires_repo() {
        let mut config = Config::default();
        config.changelog.issue_number_suffix = IssueNumberSuffix::Link;
        assert!(validate_config(&config).is_err());
        config.changelog.repo = Some("example/gantry".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
