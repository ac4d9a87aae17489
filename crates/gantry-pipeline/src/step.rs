//! Step capability

use thiserror::Error;

use gantry_core::error::GantryError;

use crate::context::StepContext;

/// How a step stopped early
#[derive(Debug, Error)]
pub enum StepError {
    /// End this step only; later steps still run. A message is reported
    /// as an error, `None` ends the step quietly.
    #[error("{}", .0.as_deref().unwrap_or("step exited"))]
    Exit(Option<String>),

    /// Stop the whole pipeline
    #[error("{0}")]
    Abort(String),

    /// Unexpected failure, propagated to the caller
    #[error(transparent)]
    Fatal(#[from] GantryError),
}

impl StepError {
    /// Message to put in the release report, if any
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Exit(message) => message.clone(),
            Self::Abort(message) => Some(message.clone()),
            Self::Fatal(err) => Some(err.to_string()),
        }
    }
}

impl From<gantry_core::error::GitError> for StepError {
    fn from(err: gantry_core::error::GitError) -> Self {
        Self::Fatal(err.into())
    }
}

impl From<std::io::Error> for StepError {
    fn from(err: std::io::Error) -> Self {
        Self::Fatal(err.into())
    }
}

/// Result of running a step
pub type StepResult = std::result::Result<(), StepError>;

/// One stage of a release pipeline
pub trait Step {
    /// Do the step's work
    fn run(&self, ctx: &mut StepContext<'_>) -> StepResult;

    /// Primary steps run without being requested
    fn primary(&self) -> bool {
        false
    }

    /// Names of earlier steps that must run first, beyond those named by inputs
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}
