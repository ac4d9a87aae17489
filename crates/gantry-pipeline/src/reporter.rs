//! Pipeline execution reporting

use std::sync::Mutex;
use std::time::Duration;

/// Events emitted while a pipeline runs
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A step is starting
    Started { component: String, step: String },
    /// A step ran to completion
    Completed {
        component: String,
        step: String,
        duration: Duration,
    },
    /// A step ended early; later steps still run
    Exited {
        component: String,
        step: String,
        message: Option<String>,
    },
    /// A step stopped the pipeline
    Aborted {
        component: String,
        step: String,
        message: String,
    },
    /// A step was not selected to run
    Skipped { component: String, step: String },
    /// The pipeline finished, fully or not
    Finished {
        component: String,
        executed: usize,
        skipped: usize,
        aborted: bool,
        duration: Duration,
    },
}

/// Receives pipeline events
pub trait PipelineReporter {
    /// Handle an event
    fn report(&self, event: &PipelineEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl PipelineReporter for TracingReporter {
    fn report(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Started { component, step } => {
                tracing::info!("{}: running step {}", component, step);
            }
            PipelineEvent::Completed {
                component,
                step,
                duration,
            } => {
                tracing::info!(
                    "{}: step {} completed in {:.1}s",
                    component,
                    step,
                    duration.as_secs_f64()
                );
            }
            PipelineEvent::Exited {
                component,
                step,
                message,
            } => match message {
                Some(message) => tracing::warn!("{}: step {} exited: {}", component, step, message),
                None => tracing::info!("{}: step {} exited early", component, step),
            },
            PipelineEvent::Aborted {
                component,
                step,
                message,
            } => {
                tracing::error!("{}: pipeline aborted at step {}: {}", component, step, message);
            }
            PipelineEvent::Skipped { component, step } => {
                tracing::debug!("{}: step {} skipped", component, step);
            }
            PipelineEvent::Finished {
                component,
                executed,
                skipped,
                aborted,
                duration,
            } => {
                tracing::info!(
                    "{}: pipeline {} ({} executed, {} skipped, {:.1}s)",
                    component,
                    if *aborted { "aborted" } else { "finished" },
                    executed,
                    skipped,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingReporter {
    /// All collected events
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl PipelineReporter for CollectingReporter {
    fn report(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
