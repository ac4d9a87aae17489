//! Commit message line parsing

mod conventional;

pub use conventional::{parse_line, Directive};
