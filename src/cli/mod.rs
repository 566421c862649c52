//! Command-line entry for harness binaries
//!
//! A harness binary compiles its specs and fixtures in, then hands them to [`run`]:
//!
//! ```no_run
//! use specrig::{Completion, FixtureRegistry, HarnessConfig, SpecRegistry};
//!
//! let specs = SpecRegistry::new().register("smoke", |t, _ctx| {
//!     t.pass("boots");
//!     Completion::done()
//! });
//! specrig::cli::run(HarnessConfig::default(), specs, FixtureRegistry::new());
//! ```
//!
//! ## Design
//!
//! Helpers return `CliResult<T>` instead of calling `process::exit`. Only [`run`] exits: on errors, and with status 0
//! once the reporter has finished when `exit_on_finish` is set. Failed assertions do not change that status.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::aggregate::RunSummary;
use crate::config::HarnessConfig;
use crate::fixture::FixtureRegistry;
use crate::harness::Harness;
use crate::spec::SpecRegistry;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Command-line usage errors, as clap reports them
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. [`run`] prints the message and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run fixture-driven specs and report the results
#[derive(Parser, Debug, Default)]
#[command(name = "specrig")]
#[command(version = VERSION)]
#[command(about = "Run fixture-driven specs and report the results", long_about = None)]
pub struct CliArgs {
    /// Specs to run, relative to the spec directory and without extension (default: all)
    #[arg(value_name = "SPEC")]
    pub specs: Vec<String>,

    /// Directory holding the spec and fixture directories
    #[arg(long, value_name = "DIR")]
    pub test_dir: Option<PathBuf>,

    /// Spec directory, relative to the test directory
    #[arg(long, value_name = "DIR")]
    pub spec_dir: Option<PathBuf>,

    /// Fixture directory, relative to the test directory
    #[arg(long, value_name = "DIR")]
    pub fixture_dir: Option<PathBuf>,

    /// Reporter: pretty, tap, none or json
    #[arg(long, value_name = "NAME")]
    pub reporter: Option<String>,

    /// Global fixture applied to every spec; repeat for more (replaces the configured list)
    #[arg(short = 'g', long = "global-fixture", value_name = "NAME")]
    pub global_fixtures: Vec<String>,

    /// Return to the caller instead of exiting once the run finishes
    #[arg(long)]
    pub no_exit: bool,

    /// TOML config file layered between the defaults and these flags
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Layer the config file (if any) and then these flags over `defaults`.
    pub fn resolve(self, defaults: HarnessConfig) -> CliResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => defaults
                .load_file(path)
                .map_err(|err| CliError::failure(format!("{:?}", miette::Report::new(err))))?,
            None => defaults,
        };

        if let Some(dir) = self.test_dir {
            config.test_dir = dir;
        }
        if let Some(dir) = self.spec_dir {
            config.spec_dir = dir;
        }
        if let Some(dir) = self.fixture_dir {
            config.fixture_dir = dir;
        }
        if self.reporter.is_some() {
            config.reporter = self.reporter;
        }
        if !self.global_fixtures.is_empty() {
            config.global_fixtures = self.global_fixtures;
        }
        if self.no_exit {
            config.exit_on_finish = false;
        }
        if !self.specs.is_empty() {
            config.spec_names = self.specs;
        }
        Ok(config)
    }
}

/// What a finished CLI run hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOutcome {
    pub summary: RunSummary,
    pub exit_on_finish: bool,
}

// ============================================================================
// Logging
// ============================================================================

/// Install the stderr `tracing` subscriber (`RUST_LOG`, default `warn`). Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// Parses the process arguments, runs the harness and exits with status 0 when `exit_on_finish` is set. With
/// `--no-exit` the summary is returned instead.
pub fn run(defaults: HarnessConfig, specs: SpecRegistry, fixtures: FixtureRegistry) -> RunSummary {
    init_logging();

    match run_from(std::env::args_os(), defaults, specs, fixtures) {
        Ok(outcome) => {
            if outcome.exit_on_finish {
                process::exit(ExitCode::SUCCESS.0);
            }
            outcome.summary
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Parse `args` and run the harness without touching the process.
pub fn run_from<I, T>(
    args: I,
    defaults: HarnessConfig,
    specs: SpecRegistry,
    fixtures: FixtureRegistry,
) -> CliResult<CliOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = CliArgs::try_parse_from(args).map_err(|err| {
        let code = if err.use_stderr() { ExitCode::USAGE } else { ExitCode::SUCCESS };
        CliError::new(err.to_string(), code)
    })?;
    let config = args.resolve(defaults)?;
    execute(config, specs, fixtures)
}

fn execute(config: HarnessConfig, specs: SpecRegistry, fixtures: FixtureRegistry) -> CliResult<CliOutcome> {
    let exit_on_finish = config.exit_on_finish;
    let run = Harness::new(config)
        .with_specs(specs)
        .with_fixtures(fixtures)
        .run_blocking()
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    Ok(CliOutcome {
        summary: run.summary,
        exit_on_finish,
    })
}

// ============================================================================
// Tests
// ============================================================================
