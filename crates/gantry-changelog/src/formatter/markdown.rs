//! Markdown changelog formatter

use chrono::NaiveDate;
use tracing::{debug, instrument};

use gantry_core::version::Version;

use crate::change_set::ChangeSet;

/// Markdown changelog formatter
pub struct MarkdownFormatter {
    /// Title written at the top of a new changelog file
    pub title: String,
}

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self {
            title: "Release History".to_string(),
        }
    }

    /// Set the changelog title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render a versioned changelog entry:
    ///
    /// ```text
    /// ### v1.3.0 / 2024-05-01
    ///
    /// #### Features
    ///
    /// * Add widgets
    /// ```
    #[instrument(skip(self, change_set), fields(version = %version, groups = change_set.groups().len()))]
    pub fn format_entry(&self, change_set: &ChangeSet, version: &Version, date: NaiveDate) -> String {
        let mut output = format!("### v{} / {}\n\n", version, date.format("%Y-%m-%d"));
        output.push_str(&self.format_notes(change_set));
        debug!(output_len = output.len(), "markdown changelog formatted");
        output
    }

    /// Render the grouped changes without a version heading, for release
    /// notes and pull request bodies
    pub fn format_notes(&self, change_set: &ChangeSet) -> String {
        let mut output = String::new();

        for group in change_set.groups() {
            if group.changes.is_empty() {
                continue;
            }

            if let Some(header) = &group.header {
                output.push_str(&format!("#### {}\n\n", header));
            }
            for change in &group.changes {
                output.push_str(&format!("* {}\n", change));
            }
            output.push('\n');
        }

        output
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}
