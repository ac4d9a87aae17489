//! Step selection and execution

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use gantry_core::config::{CollisionPolicy, InputDestination, OutputSource, StepSettings};
use gantry_core::error::{GantryError, PipelineError, Result};
use gantry_core::types::ReleaseReport;

use crate::artifact::ArtifactDir;
use crate::context::{step_failure, ReleaseTarget, StepContext};
use crate::registry::StepRegistry;
use crate::reporter::{PipelineEvent, PipelineReporter, TracingReporter};
use crate::step::{Step, StepError, StepResult};

/// Where a step is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Not yet considered
    Unmarked,
    /// Selected to run
    WillRun,
    /// Ran, successfully or not
    Executed,
    /// Not selected
    Skipped,
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every selected step ran
    Completed,
    /// A step stopped the pipeline
    Aborted {
        /// Step that aborted
        step: String,
    },
}

struct PlannedStep {
    settings: StepSettings,
    step: Box<dyn Step>,
    state: StepState,
}

/// The steps of one component's release
pub struct Pipeline {
    steps: Vec<PlannedStep>,
    reporters: Vec<Arc<dyn PipelineReporter>>,
}

impl Pipeline {
    /// Build every configured step. Unknown step types and duplicate names
    /// fail here, before anything runs.
    #[instrument(skip_all, fields(steps = settings.len()))]
    pub fn build(settings: &[StepSettings], registry: &StepRegistry) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut steps = Vec::with_capacity(settings.len());
        for step_settings in settings {
            if !seen.insert(step_settings.name.as_str()) {
                return Err(PipelineError::DuplicateStep(step_settings.name.clone()).into());
            }
            steps.push(PlannedStep {
                settings: step_settings.clone(),
                step: registry.build(step_settings)?,
                state: StepState::Unmarked,
            });
        }
        debug!(count = steps.len(), "pipeline built");
        Ok(Self {
            steps,
            reporters: vec![Arc::new(TracingReporter)],
        })
    }

    /// Add a reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn PipelineReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Number of configured steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are configured
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// State of a step by name
    pub fn state(&self, name: &str) -> Option<StepState> {
        self.steps
            .iter()
            .find(|s| s.settings.name == name)
            .map(|s| s.state)
    }

    /// Names of the steps selected to run
    pub fn will_run(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::WillRun)
            .map(|s| s.settings.name.as_str())
            .collect()
    }

    /// Select the steps to run: every requested or primary step, together
    /// with the earlier steps it depends on.
    ///
    /// Every step's dependencies must name earlier steps, whether or not the
    /// step ends up selected.
    #[instrument(skip(self), fields(steps = self.steps.len()))]
    pub fn resolve_run(&mut self) -> Result<()> {
        let dependencies = (0..self.steps.len())
            .map(|index| self.dependency_indices(index))
            .collect::<Result<Vec<_>>>()?;

        for planned in &mut self.steps {
            planned.state = StepState::Unmarked;
        }
        for index in 0..self.steps.len() {
            let planned = &self.steps[index];
            if planned.settings.run || planned.step.primary() {
                self.mark(index, &dependencies);
            }
        }
        for planned in &mut self.steps {
            if planned.state == StepState::Unmarked {
                planned.state = StepState::Skipped;
            }
        }

        info!(will_run = ?self.will_run(), "pipeline steps resolved");
        Ok(())
    }

    fn dependency_indices(&self, index: usize) -> Result<Vec<usize>> {
        let planned = &self.steps[index];
        planned
            .settings
            .inputs
            .iter()
            .map(|input| input.name.clone())
            .chain(planned.step.dependencies())
            .map(|dependency| {
                self.steps[..index]
                    .iter()
                    .position(|s| s.settings.name == dependency)
                    .ok_or_else(|| {
                        GantryError::from(PipelineError::DependencyNotFound {
                            step: planned.settings.name.clone(),
                            dependency,
                        })
                    })
            })
            .collect()
    }

    fn mark(&mut self, index: usize, dependencies: &[Vec<usize>]) {
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            if self.steps[current].state == StepState::WillRun {
                continue;
            }
            self.steps[current].state = StepState::WillRun;
            pending.extend(&dependencies[current]);
        }
    }

    fn broadcast(&self, event: PipelineEvent) {
        for reporter in &self.reporters {
            reporter.report(&event);
        }
    }

    /// Run the selected steps in declaration order.
    ///
    /// A local exit ends one step; an abort ends the run with
    /// [`RunOutcome::Aborted`]. Any other failure is recorded and returned as
    /// an error. Steps not selected by [`resolve_run`](Self::resolve_run)
    /// are skipped.
    #[instrument(skip_all, fields(component = %target.component.name(), version = %target.version))]
    pub fn run(
        &mut self,
        target: &ReleaseTarget<'_>,
        artifacts: &mut ArtifactDir,
        report: &mut ReleaseReport,
    ) -> Result<RunOutcome> {
        let start = Instant::now();
        let component = target.component.name().to_string();
        let mut outcome = RunOutcome::Completed;

        for index in 0..self.steps.len() {
            let name = self.steps[index].settings.name.clone();
            match self.steps[index].state {
                StepState::WillRun => {}
                StepState::Executed => continue,
                StepState::Unmarked | StepState::Skipped => {
                    self.steps[index].state = StepState::Skipped;
                    self.broadcast(PipelineEvent::Skipped {
                        component: component.clone(),
                        step: name,
                    });
                    continue;
                }
            }

            self.broadcast(PipelineEvent::Started {
                component: component.clone(),
                step: name.clone(),
            });
            let step_start = Instant::now();
            let result = self.execute(index, target, artifacts, report);
            self.steps[index].state = StepState::Executed;

            match result {
                Ok(()) => self.broadcast(PipelineEvent::Completed {
                    component: component.clone(),
                    step: name,
                    duration: step_start.elapsed(),
                }),
                Err(StepError::Exit(message)) => {
                    if let Some(message) = &message {
                        report.add_error(message.clone());
                    }
                    self.broadcast(PipelineEvent::Exited {
                        component: component.clone(),
                        step: name,
                        message,
                    });
                }
                Err(StepError::Abort(message)) => {
                    report.add_error(message.clone());
                    self.broadcast(PipelineEvent::Aborted {
                        component: component.clone(),
                        step: name.clone(),
                        message,
                    });
                    outcome = RunOutcome::Aborted { step: name };
                    break;
                }
                Err(StepError::Fatal(err)) => {
                    let message = format!("{}: step {} failed: {}", component, name, err);
                    report.add_error(message.clone());
                    self.broadcast(PipelineEvent::Aborted {
                        component: component.clone(),
                        step: name,
                        message,
                    });
                    return Err(err);
                }
            }
        }

        let executed = self
            .steps
            .iter()
            .filter(|s| s.state == StepState::Executed)
            .count();
        let skipped = self
            .steps
            .iter()
            .filter(|s| s.state == StepState::Skipped)
            .count();
        self.broadcast(PipelineEvent::Finished {
            component,
            executed,
            skipped,
            aborted: outcome != RunOutcome::Completed,
            duration: start.elapsed(),
        });
        Ok(outcome)
    }

    fn execute(
        &self,
        index: usize,
        target: &ReleaseTarget<'_>,
        artifacts: &mut ArtifactDir,
        report: &mut ReleaseReport,
    ) -> StepResult {
        let planned = &self.steps[index];
        let settings = &planned.settings;
        let component = target.component.name();

        if settings.clean {
            let keep: Vec<PathBuf> = artifacts.base().map(Path::to_path_buf).into_iter().collect();
            target.repo.clean_working_tree(&keep)?;
        }

        copy_inputs(settings, target, artifacts)
            .map_err(|err| contain(component, settings, err))?;

        {
            let mut ctx = StepContext::new(target, settings, artifacts, report);
            planned.step.run(&mut ctx)?;
        }

        copy_outputs(settings, target, artifacts)
            .map_err(|err| contain(component, settings, err))?;
        Ok(())
    }
}

/// Artifact problems fail the step; anything else is fatal
fn contain(component: &str, settings: &StepSettings, err: GantryError) -> StepError {
    match err {
        GantryError::Pipeline(
            PipelineError::ArtifactCollision { .. } | PipelineError::ArtifactMissing { .. },
        ) => step_failure(component, settings, &err.to_string()),
        other => StepError::Fatal(other),
    }
}

fn copy_inputs(
    settings: &StepSettings,
    target: &ReleaseTarget<'_>,
    artifacts: &mut ArtifactDir,
) -> Result<()> {
    for input in &settings.inputs {
        let root = match input.dest {
            InputDestination::None => continue,
            InputDestination::Component => target.component_dir(),
            InputDestination::RepoRoot => target.repo.root().to_path_buf(),
            InputDestination::Output => artifacts.output(&settings.name)?,
            InputDestination::Temp => artifacts.temp(&settings.name)?,
        };
        let upstream = artifacts.output(&input.name)?;
        let source = match &input.source_path {
            Some(path) => upstream.join(path),
            None => upstream,
        };
        let dest = match (&input.dest_path, &input.source_path) {
            (Some(path), _) => root.join(path),
            (None, Some(path)) if source.is_file() => {
                root.join(path.file_name().unwrap_or(path.as_os_str()))
            }
            _ => root,
        };

        debug!(
            step = %settings.name,
            from = %input.name,
            source = %source.display(),
            dest = %dest.display(),
            "copying input artifact"
        );
        copy_artifact(&settings.name, &source, &dest, input.collisions)?;
    }
    Ok(())
}

fn copy_outputs(
    settings: &StepSettings,
    target: &ReleaseTarget<'_>,
    artifacts: &mut ArtifactDir,
) -> Result<()> {
    for output in &settings.outputs {
        let root = match output.source {
            OutputSource::Component => target.component_dir(),
            OutputSource::RepoRoot => target.repo.root().to_path_buf(),
            OutputSource::Temp => artifacts.temp(&settings.name)?,
        };
        let source = root.join(&output.source_path);
        let dest = artifacts
            .output(&settings.name)?
            .join(output.dest_path.as_ref().unwrap_or(&output.source_path));

        debug!(
            step = %settings.name,
            source = %source.display(),
            dest = %dest.display(),
            "exporting output artifact"
        );
        copy_artifact(&settings.name, &source, &dest, output.collisions)?;
    }
    Ok(())
}

/// Copy a file or a directory tree, applying the collision policy per file
fn copy_artifact(step: &str, source: &Path, dest: &Path, policy: CollisionPolicy) -> Result<()> {
    if !source.exists() {
        return Err(PipelineError::ArtifactMissing {
            step: step.to_string(),
            path: source.to_path_buf(),
        }
        .into());
    }
    if source.is_file() {
        return copy_file(step, source, dest, policy);
    }

    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(step, entry.path(), &target, policy)?;
        }
    }
    Ok(())
}

fn copy_file(step: &str, source: &Path, dest: &Path, policy: CollisionPolicy) -> Result<()> {
    if dest.exists() {
        match policy {
            CollisionPolicy::Error => {
                return Err(PipelineError::ArtifactCollision {
                    step: step.to_string(),
                    path: dest.to_path_buf(),
                }
                .into())
            }
            CollisionPolicy::Keep => return Ok(()),
            CollisionPolicy::Replace => {}
        }
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::Deserialize;
    use tempfile::TempDir;

    use gantry_core::component::Component;
    use gantry_core::config::{ComponentConfig, InputSettings, OutputSettings};
    use gantry_core::version::Version;
    use gantry_git::MemoryRepository;

    use crate::registry::parse_options;
    use crate::reporter::CollectingReporter;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct ScriptOptions {
        primary: bool,
        after: Vec<String>,
        writes: Option<String>,
        expects: Option<String>,
    }

    #[derive(Clone, Copy)]
    enum Ending {
        Succeed,
        Fail,
        Abort,
        Fatal,
    }

    struct ScriptedStep {
        ending: Ending,
        options: ScriptOptions,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Step for ScriptedStep {
        fn run(&self, ctx: &mut StepContext<'_>) -> StepResult {
            let name = ctx.step_name().to_string();
            self.log.borrow_mut().push(name.clone());

            if let Some(file) = &self.options.expects {
                let found = ctx.temp_dir()?.join(file);
                if !found.exists() {
                    return Err(ctx.fail(format!("{} was not delivered", file)));
                }
            }
            if let Some(file) = &self.options.writes {
                fs::write(ctx.output_dir()?.join(file), &name)?;
            }

            match self.ending {
                Ending::Succeed => {
                    ctx.success(format!("{} done", name));
                    Ok(())
                }
                Ending::Fail => Err(ctx.fail("boom")),
                Ending::Abort => Err(StepError::Abort(format!("{} gave up", name))),
                Ending::Fatal => Err(GantryError::other("disk on fire").into()),
            }
        }

        fn primary(&self) -> bool {
            self.options.primary
        }

        fn dependencies(&self) -> Vec<String> {
            self.options.after.clone()
        }
    }

    fn registry(log: &Rc<RefCell<Vec<String>>>) -> StepRegistry {
        let mut registry = StepRegistry::empty();
        for (name, ending) in [
            ("ok", Ending::Succeed),
            ("fail", Ending::Fail),
            ("abort", Ending::Abort),
            ("fatal", Ending::Fatal),
        ] {
            let log = Rc::clone(log);
            registry.register(name, move |settings| {
                Ok(Box::new(ScriptedStep {
                    ending,
                    options: parse_options(settings)?,
                    log: Rc::clone(&log),
                }) as Box<dyn Step>)
            });
        }
        registry
    }

    struct Fixture {
        dir: TempDir,
        repo: MemoryRepository,
        component: Component,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("core")).unwrap();
            let mut repo = MemoryRepository::new(dir.path());
            repo.add_commit("feat: initial", &["core/lib.rs"]);
            let component = Component::new(ComponentConfig::new("core", "core"), None).unwrap();
            Self {
                dir,
                repo,
                component,
                log: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn target(&self) -> ReleaseTarget<'_> {
            ReleaseTarget {
                component: &self.component,
                version: Version::parse("1.0.0").unwrap(),
                sha: self.repo.head().unwrap_or_default().to_string(),
                repo: &self.repo,
                remote: "origin".to_string(),
                dry_run: false,
            }
        }

        fn pipeline(&self, steps: &[StepSettings]) -> Result<Pipeline> {
            let mut pipeline = Pipeline::build(steps, &registry(&self.log))?;
            pipeline.resolve_run()?;
            Ok(pipeline)
        }

        fn run(&self, pipeline: &mut Pipeline) -> (Result<RunOutcome>, ReleaseReport) {
            let mut artifacts = ArtifactDir::new();
            let mut report = ReleaseReport::new();
            let outcome = pipeline.run(&self.target(), &mut artifacts, &mut report);
            (outcome, report)
        }

        fn ran(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    #[test]
    fn test_resolve_run_marks_requested_primary_and_dependencies() {
        let fixture = Fixture::new();
        let pipeline = fixture
            .pipeline(&[
                StepSettings::new("build", "ok"),
                StepSettings::new("docs", "ok"),
                StepSettings::new("lint", "ok"),
                StepSettings::new("publish", "ok")
                    .with_option("primary", serde_json::json!(true))
                    .with_input(InputSettings::new("build", InputDestination::Temp)),
                StepSettings::new("announce", "ok")
                    .with_run(true)
                    .with_option("after", serde_json::json!(["lint"])),
            ])
            .unwrap();

        assert_eq!(pipeline.will_run(), vec!["build", "lint", "publish", "announce"]);
        assert_eq!(pipeline.state("docs"), Some(StepState::Skipped));
    }

    #[test]
    fn test_missing_dependency_is_fatal() {
        let fixture = Fixture::new();
        let err = fixture
            .pipeline(&[StepSettings::new("publish", "ok")
                .with_input(InputSettings::new("build", InputDestination::Temp))])
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Dependency 'build' not found before step 'publish'"
        );
    }

    #[test]
    fn test_later_declared_dependency_is_fatal() {
        let fixture = Fixture::new();
        let err = fixture
            .pipeline(&[
                StepSettings::new("publish", "ok").with_option("after", serde_json::json!(["build"])),
                StepSettings::new("build", "ok"),
            ])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            GantryError::Pipeline(PipelineError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_step_names_are_rejected() {
        let fixture = Fixture::new();
        let err = fixture
            .pipeline(&[StepSettings::new("build", "ok"), StepSettings::new("build", "ok")])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Duplicate step name: build");
    }

    #[test]
    fn test_built_pipeline_logs_through_tracing() {
        let pipeline = Pipeline::build(&[], &StepRegistry::new()).unwrap();
        assert_eq!(pipeline.reporters.len(), 1);

        let pipeline = pipeline.with_reporter(Arc::new(CollectingReporter::default()));
        assert_eq!(pipeline.reporters.len(), 2);
    }

    #[test]
    fn test_local_exit_continues_with_next_step() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("one", "ok").with_run(true),
                StepSettings::new("two", "fail").with_run(true),
                StepSettings::new("three", "ok").with_run(true),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap(), RunOutcome::Completed);
        assert_eq!(fixture.ran(), vec!["one", "two", "three"]);
        assert_eq!(report.successes, vec!["core: one done", "core: three done"]);
        assert_eq!(report.errors, vec!["core: step two failed: boom"]);
        assert_eq!(pipeline.state("three"), Some(StepState::Executed));
    }

    #[test]
    fn test_abort_stops_later_steps() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("one", "ok").with_run(true),
                StepSettings::new("two", "fail")
                    .with_run(true)
                    .with_abort_on_error(true),
                StepSettings::new("three", "ok").with_run(true),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(
            outcome.unwrap(),
            RunOutcome::Aborted {
                step: "two".to_string()
            }
        );
        assert_eq!(fixture.ran(), vec!["one", "two"]);
        assert_eq!(report.successes, vec!["core: one done"]);
        assert_eq!(pipeline.state("three"), Some(StepState::WillRun));
    }

    #[test]
    fn test_explicit_abort_is_recorded() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("one", "abort").with_run(true),
                StepSettings::new("two", "ok").with_run(true),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert!(matches!(outcome.unwrap(), RunOutcome::Aborted { .. }));
        assert_eq!(report.errors, vec!["one gave up"]);
        assert_eq!(fixture.ran(), vec!["one"]);
    }

    #[test]
    fn test_fatal_error_propagates_and_is_recorded() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("one", "fatal").with_run(true),
                StepSettings::new("two", "ok").with_run(true),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap_err().to_string(), "disk on fire");
        assert_eq!(report.errors, vec!["core: step one failed: disk on fire"]);
        assert_eq!(fixture.ran(), vec!["one"]);
    }

    #[test]
    fn test_inputs_are_copied_from_upstream_output() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("build", "ok").with_option("writes", serde_json::json!("pkg.gem")),
                StepSettings::new("publish", "ok")
                    .with_run(true)
                    .with_option("expects", serde_json::json!("pkg.gem"))
                    .with_input(InputSettings::new("build", InputDestination::Temp)),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap(), RunOutcome::Completed);
        assert!(report.is_ok(), "{}", report.render());
        assert_eq!(fixture.ran(), vec!["build", "publish"]);
    }

    #[test]
    fn test_collision_policies() {
        let fixture = Fixture::new();
        let existing = fixture.dir.path().join("core").join("pkg.gem");
        fs::write(&existing, "original").unwrap();

        let steps = |policy| {
            vec![
                StepSettings::new("build", "ok")
                    .with_option("writes", serde_json::json!("pkg.gem")),
                StepSettings::new("publish", "ok")
                    .with_run(true)
                    .with_clean(false)
                    .with_input(
                        InputSettings::new("build", InputDestination::Component)
                            .with_collisions(policy),
                    ),
            ]
        };

        let mut pipeline = fixture.pipeline(&steps(CollisionPolicy::Error)).unwrap();
        let (_, report) = fixture.run(&mut pipeline);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Artifact collision"));

        let mut pipeline = fixture.pipeline(&steps(CollisionPolicy::Keep)).unwrap();
        let (_, report) = fixture.run(&mut pipeline);
        assert!(report.is_ok());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "original");

        let mut pipeline = fixture.pipeline(&steps(CollisionPolicy::Replace)).unwrap();
        let (_, report) = fixture.run(&mut pipeline);
        assert!(report.is_ok());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "build");
    }

    #[test]
    fn test_outputs_are_exported_for_later_steps() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.dir.path().join("core/dist")).unwrap();
        fs::write(fixture.dir.path().join("core/dist/site.html"), "<html>").unwrap();

        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("docs", "ok")
                    .with_clean(false)
                    .with_output(OutputSettings::new(OutputSource::Component, "dist")),
                StepSettings::new("upload", "ok")
                    .with_run(true)
                    .with_clean(false)
                    .with_option("expects", serde_json::json!("dist/site.html"))
                    .with_input(InputSettings::new("docs", InputDestination::Temp)),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap(), RunOutcome::Completed);
        assert!(report.is_ok(), "{}", report.render());
    }

    #[test]
    fn test_input_can_pick_and_rename_one_file() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.dir.path().join("core/dist")).unwrap();
        fs::write(fixture.dir.path().join("core/dist/site.html"), "<html>").unwrap();

        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("docs", "ok")
                    .with_clean(false)
                    .with_output(OutputSettings::new(OutputSource::Component, "dist")),
                StepSettings::new("upload", "ok")
                    .with_run(true)
                    .with_clean(false)
                    .with_option("expects", serde_json::json!("public/index.html"))
                    .with_input(
                        InputSettings::new("docs", InputDestination::Temp)
                            .with_source_path("dist/site.html")
                            .with_dest_path("public/index.html"),
                    ),
            ])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap(), RunOutcome::Completed);
        assert!(report.is_ok(), "{}", report.render());
    }

    #[test]
    fn test_missing_output_fails_the_step() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[StepSettings::new("docs", "ok")
                .with_run(true)
                .with_output(OutputSettings::new(OutputSource::Component, "dist"))])
            .unwrap();
        let (outcome, report) = fixture.run(&mut pipeline);

        assert_eq!(outcome.unwrap(), RunOutcome::Completed);
        assert!(report.errors[0].contains("not found"));
    }

    #[test]
    fn test_clean_runs_unless_disabled() {
        let fixture = Fixture::new();
        let mut pipeline = fixture
            .pipeline(&[
                StepSettings::new("one", "ok").with_run(true),
                StepSettings::new("two", "ok").with_run(true).with_clean(false),
                StepSettings::new("three", "ok").with_run(true),
            ])
            .unwrap();
        fixture.run(&mut pipeline).0.unwrap();
        assert_eq!(fixture.repo.clean_count(), 2);
    }

    #[test]
    fn test_reporter_sees_skips_and_finish() {
        let fixture = Fixture::new();
        let collecting = Arc::new(CollectingReporter::default());
        let mut pipeline = Pipeline::build(
            &[
                StepSettings::new("build", "ok"),
                StepSettings::new("publish", "ok").with_run(true),
            ],
            &registry(&fixture.log),
        )
        .unwrap()
        .with_reporter(collecting.clone());
        pipeline.resolve_run().unwrap();
        fixture.run(&mut pipeline).0.unwrap();

        let events = collecting.events();
        assert!(matches!(&events[0], PipelineEvent::Skipped { step, .. } if step == "build"));
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::Finished {
                executed: 1,
                skipped: 1,
                aborted: false,
                ..
            })
        ));
    }
}
