//! One harness run, wired end to end
//!
//! ```text
//! select specs -> start aggregator task -> run units in order -> AllFinished -> summary
//! ```
//!
//! [`Harness::run`] never exits the process: it returns the summary and the per-unit reports. Exiting on finish is
//! the CLI's job (see [`crate::cli::run`]).

use thiserror::Error;

use crate::aggregate::{ResultAggregator, RunSummary};
use crate::config::HarnessConfig;
use crate::events;
use crate::fixture::{FixtureRegistry, FixtureSources};
use crate::reporter::{self, Reporter};
use crate::runner::{TestRunner, UnitReport};
use crate::selector;
use crate::spec::{RegistrySpecLoader, SpecRegistry};

/// Errors from the harness plumbing itself. Spec and fixture failures are assertion results, not errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to start the async runtime")]
    Runtime(#[source] std::io::Error),

    #[error("result aggregator stopped before the run finished")]
    Aggregator(#[source] tokio::task::JoinError),
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct HarnessRun {
    pub summary: RunSummary,
    /// One report per selected spec, in run order
    pub units: Vec<UnitReport>,
}

/// A configured harness, ready to run.
pub struct Harness {
    config: HarnessConfig,
    specs: SpecRegistry,
    fixtures: FixtureRegistry,
    reporter: Option<Box<dyn Reporter>>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            specs: SpecRegistry::new(),
            fixtures: FixtureRegistry::new(),
            reporter: None,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn with_specs(mut self, specs: SpecRegistry) -> Self {
        self.specs = specs;
        self
    }

    pub fn with_fixtures(mut self, fixtures: FixtureRegistry) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Use `reporter` instead of the one named by the configuration.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Run every selected spec. Must be called inside a tokio runtime.
    #[tracing::instrument(skip_all, fields(test_dir = %self.config.test_dir.display()))]
    pub async fn run(self) -> Result<HarnessRun, HarnessError> {
        let Harness {
            config,
            specs,
            fixtures,
            reporter,
        } = self;

        let paths = selector::select(&config.test_dir, &config.spec_dir, &config.spec_names);
        tracing::info!(specs = paths.len(), globals = config.global_fixtures.len(), "starting run");

        let reporter = reporter.unwrap_or_else(|| reporter::resolve_stdout(config.reporter.as_deref()));
        let (sink, stream) = events::channel();
        let aggregator = tokio::spawn(ResultAggregator::new(reporter).drive(stream));

        let runner = TestRunner::new(
            &config,
            RegistrySpecLoader::new(config.spec_root(), specs),
            FixtureSources::new(config.fixture_root(), fixtures),
            sink,
        );
        let units = runner.run_all(&paths).await;
        drop(runner);

        let summary = aggregator.await.map_err(HarnessError::Aggregator)?;
        tracing::info!(total = summary.total, pass = summary.pass, fail = summary.fail, "run complete");
        Ok(HarnessRun { summary, units })
    }

    /// Run on a fresh current-thread runtime.
    pub fn run_blocking(self) -> Result<HarnessRun, HarnessError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HarnessError::Runtime)?;
        runtime.block_on(self.run())
    }
}
