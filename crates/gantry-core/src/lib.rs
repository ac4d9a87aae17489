//! Gantry Core - Core library for release management
//!
//! This crate provides the foundational types, error handling, configuration,
//! semver arithmetic and component model for the Gantry release engine.

pub mod component;
pub mod config;
pub mod error;
pub mod files;
pub mod semver;
pub mod types;
pub mod version;

pub use component::{pessimistic_constraint, Component, ComponentRegistry};
pub use config::Config;
pub use error::{GantryError, Result};
pub use files::{ChangelogFile, VersionFile};
pub use semver::Semver;
pub use types::ReleaseReport;
pub use version::Version;
