//! Shared helpers: throwaway `spec/` + `fixture/` trees

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use specrig::HarnessConfig;
use tempfile::TempDir;

/// A temporary test directory laid out the way the harness expects.
pub struct Suite {
    dir: TempDir,
}

impl Suite {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("spec")).unwrap();
        fs::create_dir_all(dir.path().join("fixture")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create an (empty) spec file for `key`, e.g. `nested/deep`.
    pub fn spec(&self, key: &str) -> PathBuf {
        let path = self.root().join("spec").join(format!("{key}.rs"));
        write(&path, "");
        path
    }

    /// Write a JSON fixture file for `key`.
    pub fn json_fixture(&self, key: &str, value: &Value) -> PathBuf {
        let path = self.root().join("fixture").join(format!("{key}.json"));
        write(&path, &serde_json::to_string_pretty(value).unwrap());
        path
    }

    /// Write a TOML fixture file for `key`.
    pub fn toml_fixture(&self, key: &str, source: &str) -> PathBuf {
        let path = self.root().join("fixture").join(format!("{key}.toml"));
        write(&path, source);
        path
    }

    /// Config pointing at this suite that never exits the process.
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new().with_test_dir(self.root()).with_exit_on_finish(false)
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
