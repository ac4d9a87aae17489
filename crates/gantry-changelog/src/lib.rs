//! Gantry Changelog - Change classification and changelog rendering
//!
//! This crate turns commit messages into a [`ChangeSet`]: classified,
//! revert-aware change groups with an aggregate semver level. A finished set
//! renders into a changelog entry or release notes.

pub mod change_set;
pub mod formatter;
pub mod parser;

pub use change_set::{ChangeSet, Group, Input};
pub use formatter::MarkdownFormatter;
pub use parser::{parse_line, Directive};
