//! Gantry Git - Git operations for release orchestration
//!
//! This crate provides the repository collaborator used by the release
//! engine: commit history with touched paths, tag lookup by component tag
//! format, tag creation and pushing, and working tree resets.

mod commits;
mod memory;
mod release;
mod remote;
mod repository;
mod status;
mod tags;
pub mod types;

pub use memory::MemoryRepository;
pub use release::ReleaseRepository;
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo, TagPattern};
