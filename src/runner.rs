//! The test runner
//!
//! Drives one unit at a time through `Pending -> FixtureResolving -> Executing -> Completed`. A unit is one selected
//! spec file. Units never overlap: [`TestRunner::run_all`] awaits each unit's completion before starting the next.
//!
//! The spec body runs on its own tokio task so a panic stays inside the unit. Whatever the body does (returns,
//! resolves, rejects, panics) the unit still reaches `Completed` and the run moves on.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::assertion::TestHandle;
use crate::config::HarnessConfig;
use crate::events::{RecordSink, TestRecord};
use crate::fixture::loader::panic_message;
use crate::fixture::{FixtureContext, FixtureLoader, FixtureMerger};
use crate::module;
use crate::spec::{Completion, Spec, SpecLoader};

/// Lifecycle state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    FixtureResolving,
    Executing,
    Completed,
}

/// How a unit's completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The body returned without a pending completion
    Synchronous,
    /// The pending completion resolved
    Resolved,
    /// The pending completion settled with an error
    Rejected,
    /// The body or its completion panicked
    Panicked,
    /// The spec module could not be loaded
    NotLoaded,
}

/// What happened to one unit.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub path: PathBuf,
    /// Spec key (`nested/deep`); the record name is the absolute path
    pub key: String,
    pub id: usize,
    /// Every state the unit passed through, in order
    pub states: Vec<UnitState>,
    pub settlement: Settlement,
    pub started_at: Instant,
    pub finished_at: Instant,
}

impl UnitReport {
    pub fn state(&self) -> UnitState {
        self.states.last().copied().unwrap_or(UnitState::Pending)
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at.duration_since(self.started_at)
    }
}

/// Runs units against a spec loader and a fixture loader.
pub struct TestRunner {
    specs: Box<dyn SpecLoader + Send + Sync>,
    fixtures: Box<dyn FixtureLoader + Send + Sync>,
    spec_root: PathBuf,
    fixture_root: PathBuf,
    global_fixtures: Vec<String>,
    sink: RecordSink,
}

impl TestRunner {
    pub fn new<S, F>(config: &HarnessConfig, specs: S, fixtures: F, sink: RecordSink) -> Self
    where
        S: SpecLoader + Send + Sync + 'static,
        F: FixtureLoader + Send + Sync + 'static,
    {
        Self {
            specs: Box::new(specs),
            fixtures: Box::new(fixtures),
            spec_root: config.spec_root(),
            fixture_root: config.fixture_root(),
            global_fixtures: config.global_fixtures.clone(),
            sink,
        }
    }

    /// Run every path in order, then signal the end of the run.
    pub async fn run_all(&self, paths: &[PathBuf]) -> Vec<UnitReport> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.run(path).await);
        }
        self.sink.finish();
        reports
    }

    /// Run a single unit to completion.
    #[tracing::instrument(level = "debug", skip_all, fields(spec = %path.display()))]
    pub async fn run(&self, path: &Path) -> UnitReport {
        let started_at = Instant::now();
        let mut states = vec![UnitState::Pending];

        let key = module::module_key(&self.spec_root, path);
        let name = path.display().to_string();
        let id = self.sink.next_test_id();
        let handle = TestHandle::new(id, name.clone(), self.sink.clone());
        self.sink.emit(TestRecord::Test { id, name });

        states.push(UnitState::FixtureResolving);
        let merger = FixtureMerger::new(self.fixtures.as_ref(), &self.fixture_root);
        let context = merger.merge(&self.global_fixtures, path, &handle);

        states.push(UnitState::Executing);
        let settlement = match self.specs.load_spec(path) {
            Ok(spec) => execute(spec, handle, context).await,
            Err(err) => {
                handle.fail(format!("Unable to load spec <{key}> -> {err}"));
                Settlement::NotLoaded
            }
        };

        states.push(UnitState::Completed);
        self.sink.emit(TestRecord::End { test: id });
        tracing::debug!(?settlement, "unit completed");

        UnitReport {
            path: path.to_path_buf(),
            key,
            id,
            states,
            settlement,
            started_at,
            finished_at: Instant::now(),
        }
    }
}

/// Invoke the spec on its own task and hand the settled outcome to the handle.
async fn execute(spec: Spec, handle: TestHandle, context: FixtureContext) -> Settlement {
    let spec_handle = handle.clone();
    let joined = tokio::spawn(async move {
        match spec.invoke(spec_handle, context) {
            Completion::Done => None,
            Completion::Pending(future) => Some(future.await),
        }
    })
    .await;

    match joined {
        Ok(None) => Settlement::Synchronous,
        Ok(Some(Ok(()))) => Settlement::Resolved,
        Ok(Some(Err(err))) => {
            handle.record_rejection(&err);
            Settlement::Rejected
        }
        Err(err) if err.is_panic() => {
            let payload = err.into_panic();
            handle.record_panic(&panic_message(payload.as_ref()));
            Settlement::Panicked
        }
        Err(err) => {
            handle.record_panic(&err.to_string());
            Settlement::Panicked
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{self, RecordStream, Signal};
    use crate::fixture::{FixtureRegistry, FixtureSources};
    use crate::spec::{RegistrySpecLoader, SpecRegistry};
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn layout(specs: &[&str]) -> (TempDir, HarnessConfig) {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("spec")).unwrap();
        for name in specs {
            fs::write(dir.path().join("spec").join(format!("{name}.rs")), "").unwrap();
        }
        let config = HarnessConfig::new().with_test_dir(dir.path()).with_exit_on_finish(false);
        (dir, config)
    }

    fn runner(config: &HarnessConfig, specs: SpecRegistry, fixtures: FixtureRegistry) -> (TestRunner, RecordStream) {
        let (sink, rx) = events::channel();
        let runner = TestRunner::new(
            config,
            RegistrySpecLoader::new(config.spec_root(), specs),
            FixtureSources::new(config.fixture_root(), fixtures),
            sink,
        );
        (runner, rx)
    }

    fn records(rx: &mut RecordStream) -> Vec<TestRecord> {
        let mut out = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            if let Signal::Record(record) = signal {
                out.push(record);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_sync_spec_walks_every_state() {
        let (_dir, config) = layout(&["one"]);
        let specs = SpecRegistry::new().register("one", |t: TestHandle, _| {
            t.pass("ran");
            Completion::done()
        });
        let (runner, mut rx) = runner(&config, specs, FixtureRegistry::new());

        let report = runner.run(&config.spec_root().join("one.rs")).await;
        assert_eq!(
            report.states,
            vec![
                UnitState::Pending,
                UnitState::FixtureResolving,
                UnitState::Executing,
                UnitState::Completed
            ]
        );
        assert_eq!(report.settlement, Settlement::Synchronous);
        assert_eq!(report.key, "one");

        let recs = records(&mut rx);
        assert!(matches!(recs.first(), Some(TestRecord::Test { name, .. }) if name.ends_with("one.rs")));
        assert!(matches!(recs.last(), Some(TestRecord::End { .. })));
        assert_eq!(recs.iter().filter_map(TestRecord::as_assertion).count(), 1);
    }

    #[tokio::test]
    async fn test_spec_sees_merged_context() {
        let (_dir, config) = layout(&["ctx"]);
        let config = config.with_global_fixtures(["base"]);
        let fixtures = FixtureRegistry::new()
            .data("base", json!({"k": 1, "shared": "global"}))
            .data("ctx", json!({"shared": "local"}));
        let specs = SpecRegistry::new().register("ctx", |t: TestHandle, ctx: FixtureContext| {
            t.equal(ctx.into_value(), json!({"k": 1, "shared": "local"}), "context merged");
            Completion::done()
        });
        let (runner, mut rx) = runner(&config, specs, fixtures);

        runner.run(&config.spec_root().join("ctx.rs")).await;
        let recs = records(&mut rx);
        let asserts: Vec<_> = recs.iter().filter_map(TestRecord::as_assertion).collect();
        assert_eq!(asserts.len(), 1);
        assert!(asserts[0].ok);
    }

    #[tokio::test]
    async fn test_rejection_becomes_error_assertion() {
        let (_dir, config) = layout(&["rejects"]);
        let specs = SpecRegistry::new().register_async("rejects", |_, _| async {
            Err::<(), _>(anyhow::anyhow!("db offline"))
        });
        let (runner, mut rx) = runner(&config, specs, FixtureRegistry::new());

        let report = runner.run(&config.spec_root().join("rejects.rs")).await;
        assert_eq!(report.settlement, Settlement::Rejected);
        assert_eq!(report.state(), UnitState::Completed);

        let recs = records(&mut rx);
        let failure = recs.iter().filter_map(TestRecord::as_assertion).next().unwrap();
        assert!(!failure.ok);
        assert_eq!(failure.operator, crate::events::Operator::Error);
        assert_eq!(failure.name, "db offline");
    }

    #[tokio::test]
    async fn test_panic_is_contained_to_the_unit() {
        let (_dir, config) = layout(&["boom", "after"]);
        let specs = SpecRegistry::new()
            .register("boom", |_, _| -> Completion { panic!("kaboom") })
            .register("after", |t: TestHandle, _| {
                t.pass("still running");
                Completion::done()
            });
        let (runner, mut rx) = runner(&config, specs, FixtureRegistry::new());

        let root = config.spec_root();
        let reports = runner.run_all(&[root.join("boom.rs"), root.join("after.rs")]).await;
        assert_eq!(reports[0].settlement, Settlement::Panicked);
        assert_eq!(reports[1].settlement, Settlement::Synchronous);

        let asserts: Vec<_> = records(&mut rx).into_iter().filter_map(|r| r.as_assertion().cloned()).collect();
        assert_eq!(asserts.len(), 2);
        assert_eq!(asserts[0].name, "spec panicked: kaboom");
        assert!(asserts[1].ok);
    }

    #[tokio::test]
    async fn test_missing_spec_is_reported_not_loaded() {
        let (_dir, config) = layout(&[]);
        let (runner, mut rx) = runner(&config, SpecRegistry::new(), FixtureRegistry::new());

        let report = runner.run(&config.spec_root().join("ghost.rs")).await;
        assert_eq!(report.settlement, Settlement::NotLoaded);
        assert_eq!(report.state(), UnitState::Completed);

        let recs = records(&mut rx);
        let failure = recs.iter().filter_map(TestRecord::as_assertion).next().unwrap();
        assert!(failure.name.starts_with("Unable to load spec <ghost> -> cannot find module"));
    }

    #[tokio::test]
    async fn test_run_all_sends_finish_last() {
        let (_dir, config) = layout(&["one"]);
        let specs = SpecRegistry::new().register("one", |_, _| Completion::done());
        let (runner, mut rx) = runner(&config, specs, FixtureRegistry::new());

        runner.run_all(&[config.spec_root().join("one.rs")]).await;
        let mut last = None;
        while let Ok(signal) = rx.try_recv() {
            last = Some(signal);
        }
        assert!(matches!(last, Some(Signal::AllFinished)));
    }
}
