//! Exit codes for the CLI

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Release pipeline reported failures
pub const RELEASE_FAILED: i32 = 3;
