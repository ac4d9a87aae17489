//! Gantry Pipeline - Release step execution
//!
//! A component's release runs as an ordered list of steps. Steps that are
//! requested or primary are marked together with the earlier steps they
//! depend on, then executed in declaration order. Artifacts travel between
//! steps through per-step directories of an [`ArtifactDir`].

pub mod artifact;
pub mod context;
pub mod perform;
pub mod pipeline;
pub mod registry;
pub mod reporter;
pub mod step;
pub mod steps;

pub use artifact::ArtifactDir;
pub use context::{ReleaseTarget, StepContext};
pub use perform::ReleasePerformer;
pub use pipeline::{Pipeline, RunOutcome, StepState};
pub use registry::{parse_options, StepFactory, StepRegistry};
pub use reporter::{CollectingReporter, PipelineEvent, PipelineReporter, TracingReporter};
pub use step::{Step, StepError, StepResult};
