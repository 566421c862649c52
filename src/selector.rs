//! Test selection: which spec files a run executes
//!
//! Explicit names win: each maps to `<test_dir>/<spec_dir>/<name>.rs`, in the order given, without checking that the
//! file exists (a missing file fails when the runner loads it). With no names, every `*.rs` file under the spec
//! directory is discovered recursively.
//!
//! ## Ordering
//!
//! Discovery returns files in directory-traversal order. That order is whatever the filesystem yields and differs
//! across platforms and filesystems; it is not sorted.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::absolute_dir;
use crate::spec::SPEC_EXTENSION;

/// Resolve the ordered list of absolute spec paths for a run.
#[tracing::instrument(level = "debug", skip_all, fields(test_dir = %test_dir.display(), spec_dir = %spec_dir.display()))]
pub fn select(test_dir: &Path, spec_dir: &Path, explicit_names: &[String]) -> Vec<PathBuf> {
    let root = absolute_dir(test_dir).join(spec_dir);

    if !explicit_names.is_empty() {
        return explicit_names
            .iter()
            .map(|name| root.join(format!("{name}.{SPEC_EXTENSION}")))
            .collect();
    }

    discover(&root)
}

/// Every spec file under `root`, in traversal order.
///
/// Entries the walk cannot read (permissions, symlink loops) are logged as warnings and skipped.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::warn!("spec directory '{}' does not exist; no specs to run", root.display());
        return Vec::new();
    }

    let (specs, errors) = walk(root);
    for err in &errors {
        let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
        tracing::warn!(path = %path, error = %err, "skipping unreadable entry under spec directory");
    }

    tracing::debug!(count = specs.len(), skipped = errors.len(), "discovered spec files");
    specs
}

fn walk(root: &Path) -> (Vec<PathBuf>, Vec<walkdir::Error>) {
    let mut specs = Vec::new();
    let mut errors = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let path = entry.into_path();
                if path.extension() == Some(OsStr::new(SPEC_EXTENSION)) {
                    specs.push(path);
                }
            }
            Ok(_) => {}
            Err(err) => errors.push(err),
        }
    }
    (specs, errors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_names_keep_order_and_skip_existence() {
        let dir = tempdir().unwrap();
        let paths = select(dir.path(), Path::new("spec"), &names(&["zeta", "alpha", "ghost"]));
        let root = dir.path().join("spec");
        assert_eq!(paths, vec![root.join("zeta.rs"), root.join("alpha.rs"), root.join("ghost.rs")]);
    }

    #[test]
    fn test_discovery_finds_each_spec_once_recursively() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("spec");
        fs::create_dir_all(spec.join("nested/deeper")).unwrap();
        fs::write(spec.join("a.rs"), "").unwrap();
        fs::write(spec.join("nested/b.rs"), "").unwrap();
        fs::write(spec.join("nested/deeper/c.rs"), "").unwrap();
        fs::write(spec.join("notes.md"), "").unwrap();
        fs::write(spec.join("nested/data.json"), "{}").unwrap();

        let paths = select(dir.path(), Path::new("spec"), &[]);
        assert_eq!(paths.len(), 3);

        let unique: HashSet<_> = paths.iter().cloned().collect();
        let expected: HashSet<_> = [spec.join("a.rs"), spec.join("nested/b.rs"), spec.join("nested/deeper/c.rs")]
            .into_iter()
            .collect();
        assert_eq!(unique, expected);
        assert!(paths.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_missing_spec_dir_selects_nothing() {
        let dir = tempdir().unwrap();
        assert!(select(dir.path(), Path::new("spec"), &[]).is_empty());
    }

    #[test]
    fn test_explicit_names_ignore_other_files() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("spec");
        fs::create_dir_all(&spec).unwrap();
        fs::write(spec.join("one.rs"), "").unwrap();
        fs::write(spec.join("two.rs"), "").unwrap();

        let paths = select(dir.path(), Path::new("spec"), &names(&["two"]));
        assert_eq!(paths, vec![spec.join("two.rs")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_reported_and_other_specs_still_found() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("spec");
        fs::create_dir_all(spec.join("inner")).unwrap();
        fs::write(spec.join("inner/kept.rs"), "").unwrap();
        std::os::unix::fs::symlink(&spec, spec.join("inner/loop")).unwrap();

        let (specs, errors) = walk(&spec);
        assert_eq!(specs, vec![spec.join("inner/kept.rs")]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].loop_ancestor().is_some());

        assert_eq!(discover(&spec), vec![spec.join("inner/kept.rs")]);
    }
}
