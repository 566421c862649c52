//! Harness configuration
//!
//! One [`HarnessConfig`] is built at the entry point and passed down; nothing reads process arguments after that.
//! Values are layered: code defaults, then an optional TOML file, then command-line flags.
//!
//! ## Config file
//!
//! ```toml
//! test_dir = "tests/harness"     # relative to this file
//! spec_dir = "spec"
//! fixture_dir = "fixture"
//! reporter = "tap"
//! global_fixtures = ["global/globalB"]
//! exit_on_finish = false
//! ```
//!
//! camelCase spellings (`testDir`, `globalFixtures`, ...) are accepted too.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

/// Spec directory under the test directory when none is configured.
pub const DEFAULT_SPEC_DIR: &str = "spec";
/// Fixture directory under the test directory when none is configured.
pub const DEFAULT_FIXTURE_DIR: &str = "fixture";

/// Errors raised while loading a config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file '{}'", path.display())]
    #[diagnostic(code(specrig::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}'", path.display())]
    #[diagnostic(
        code(specrig::config::parse),
        help("recognized keys: test_dir, spec_dir, fixture_dir, reporter, global_fixtures, exit_on_finish")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory holding the spec and fixture directories
    pub test_dir: PathBuf,
    /// Spec directory, relative to `test_dir`
    pub spec_dir: PathBuf,
    /// Fixture directory, relative to `test_dir`
    pub fixture_dir: PathBuf,
    /// Reporter identifier; `None` selects the built-in default
    pub reporter: Option<String>,
    /// Fixtures merged into every unit, in order
    pub global_fixtures: Vec<String>,
    /// Exit the process with status 0 once the reporter has finished
    pub exit_on_finish: bool,
    /// Spec names to run; empty runs everything discovered
    pub spec_names: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            spec_dir: PathBuf::from(DEFAULT_SPEC_DIR),
            fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
            reporter: None,
            global_fixtures: Vec::new(),
            exit_on_finish: true,
            spec_names: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    pub fn with_spec_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = dir.into();
        self
    }

    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = dir.into();
        self
    }

    pub fn with_reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = Some(reporter.into());
        self
    }

    pub fn with_global_fixtures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_fixtures = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exit_on_finish(mut self, exit: bool) -> Self {
        self.exit_on_finish = exit;
        self
    }

    pub fn with_spec_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Absolute spec directory.
    pub fn spec_root(&self) -> PathBuf {
        absolute_dir(&self.test_dir).join(&self.spec_dir)
    }

    /// Absolute fixture directory.
    pub fn fixture_root(&self) -> PathBuf {
        absolute_dir(&self.test_dir).join(&self.fixture_dir)
    }

    /// Layer a config file over this config.
    pub fn load_file(self, path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        Ok(self.apply_file(file, base))
    }

    /// Apply parsed file settings; a relative `test_dir` resolves against `base`.
    pub fn apply_file(mut self, file: ConfigFile, base: &Path) -> Self {
        if let Some(dir) = file.test_dir {
            self.test_dir = if dir.is_absolute() { dir } else { base.join(dir) };
        }
        if let Some(dir) = file.spec_dir {
            self.spec_dir = dir;
        }
        if let Some(dir) = file.fixture_dir {
            self.fixture_dir = dir;
        }
        if file.reporter.is_some() {
            self.reporter = file.reporter;
        }
        if let Some(globals) = file.global_fixtures {
            self.global_fixtures = globals;
        }
        if let Some(exit) = file.exit_on_finish {
            self.exit_on_finish = exit;
        }
        self
    }
}

/// On-disk shape of a config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(alias = "testDir")]
    pub test_dir: Option<PathBuf>,
    #[serde(alias = "specDir")]
    pub spec_dir: Option<PathBuf>,
    #[serde(alias = "fixtureDir")]
    pub fixture_dir: Option<PathBuf>,
    pub reporter: Option<String>,
    #[serde(alias = "globalFixtures")]
    pub global_fixtures: Option<Vec<String>>,
    #[serde(alias = "exitOnFinish")]
    pub exit_on_finish: Option<bool>,
}

/// Make `dir` absolute against the current directory, without resolving symlinks.
pub fn absolute_dir(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
