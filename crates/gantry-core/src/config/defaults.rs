//! Default configuration values

use crate::semver::Semver;

use super::types::{CommitTagSettings, Config, StepSettings};

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "gantry.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "gantry.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".gantry.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".gantry.toml",
    ]
}

/// Default commit tag table
pub fn default_commit_tags() -> Vec<CommitTagSettings> {
    vec![
        CommitTagSettings::new("feat", Semver::Minor, Some("Features")),
        CommitTagSettings::new("fix", Semver::Patch, Some("Bug Fixes")),
        CommitTagSettings::new("perf", Semver::Patch, Some("Performance")),
        CommitTagSettings::new("docs", Semver::Patch, Some("Documentation")),
        CommitTagSettings::new("refactor", Semver::None, None),
        CommitTagSettings::new("test", Semver::None, None),
        CommitTagSettings::new("style", Semver::None, None),
        CommitTagSettings::new("build", Semver::None, None),
        CommitTagSettings::new("ci", Semver::None, None),
        CommitTagSettings::new("chore", Semver::None, None),
    ]
}

/// Pipeline used when neither the component nor the config declares steps
pub fn default_steps() -> Vec<StepSettings> {
    vec![StepSettings::new("tag", "git_tag")]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Gantry Configuration

git:
  remote: origin
  main_branch: main
  release_ref: HEAD

changelog:
  breaking_change_header: Breaking Changes
  no_significant_updates_notice: No significant updates.
  dependency_update_header: Dependencies
  issue_number_suffix: keep
  commit_tags:
    - tag: feat
      semver: minor
      header: Features
    - tag: fix
      semver: patch
      header: Bug Fixes
    - tag: chore
      semver: none

components:
  - name: my-component
    directory: .
    changelog_path: CHANGELOG.md
    tag_format: "{name}/v{version}"

steps:
  - name: tag
    type: git_tag
"#;
