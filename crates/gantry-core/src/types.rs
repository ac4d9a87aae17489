//! Core types for Gantry

use serde::{Deserialize, Serialize};

/// Successes and failures collected while releasing.
///
/// Passed by `&mut` through the pipeline so a partial run still shows how
/// far it got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseReport {
    /// Human-readable success messages, in order
    pub successes: Vec<String>,
    /// Human-readable error messages, in order
    pub errors: Vec<String>,
}

impl ReleaseReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success
    pub fn add_success(&mut self, message: impl Into<String>) {
        self.successes.push(message.into());
    }

    /// Record an error
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Whether no errors were recorded
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether nothing was recorded at all
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }

    /// Append another report's entries
    pub fn merge(&mut self, other: ReleaseReport) {
        self.successes.extend(other.successes);
        self.errors.extend(other.errors);
    }

    /// Render as plain text, errors last
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.successes.is_empty() {
            out.push_str("Successes:\n");
            for message in &self.successes {
                out.push_str(&format!("  * {}\n", message));
            }
        }
        if !self.errors.is_empty() {
            out.push_str("Errors:\n");
            for message in &self.errors {
                out.push_str(&format!("  * {}\n", message));
            }
        }
        if out.is_empty() {
            out.push_str("Nothing to report.\n");
        }
        out
    }
}
