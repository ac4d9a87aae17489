//! Gantry Release - Release request resolution
//!
//! Turns a request such as `core cli=2.0.0` or `all` into a consistent
//! version plan: coordination groups move together, dependency-triggered
//! components follow their dependencies, and every conflict is reported in
//! one pass.

mod hint;
mod request;

pub use hint::{ComponentSpec, VersionHint};
pub use request::{RequestSpec, ResolvedComponent};
