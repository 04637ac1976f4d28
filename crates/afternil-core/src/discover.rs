//! Expanding command-line paths into Go files.
//!
//! A file is taken as is. A directory contributes its own `.go` files. A
//! `dir/...` pattern recurses, skipping the directories the go tool ignores
//! below the root: `vendor`, `testdata`, and names starting with `.` or `_`.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::orchestrator::OrchestratorError;

const RECURSIVE_SUFFIX: &str = "...";
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

/// Expand `paths` into a sorted, duplicate-free list of Go files.
pub fn expand_paths(paths: &[String], include_tests: bool) -> Result<Vec<PathBuf>, OrchestratorError> {
    let mut files = Vec::new();
    for arg in paths {
        match arg.strip_suffix(RECURSIVE_SUFFIX) {
            Some(root) => {
                let root = root.trim_end_matches('/');
                let root = if root.is_empty() { "." } else { root };
                files.extend(walk(Path::new(root), None, include_tests)?);
            }
            None => {
                let path = Path::new(arg);
                if path.is_dir() {
                    files.extend(walk(path, Some(1), include_tests)?);
                } else if path.is_file() {
                    files.push(path.to_path_buf());
                } else {
                    return Err(OrchestratorError::Missing { path: arg.clone() });
                }
            }
        }
    }
    files.sort();
    files.dedup();
    tracing::debug!(files = files.len(), "expanded input paths");
    Ok(files)
}

fn walk(root: &Path, max_depth: Option<usize>, include_tests: bool) -> Result<Vec<PathBuf>, OrchestratorError> {
    if !root.is_dir() {
        return Err(OrchestratorError::Missing {
            path: root.display().to_string(),
        });
    }
    let mut walker = WalkDir::new(root).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
    {
        let entry = entry.map_err(|source| OrchestratorError::Walk {
            path: root.display().to_string(),
            source,
        })?;
        if entry.file_type().is_file() && is_go_source(entry.path(), include_tests) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_go_source(path: &Path, include_tests: bool) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && (include_tests || !name.ends_with("_test.go"))
}

/// Whether the source carries Go's generated-code header.
pub fn is_generated(source: &str) -> bool {
    source
        .lines()
        .take_while(|line| !line.starts_with("package "))
        .any(|line| line.starts_with("// Code generated ") && line.trim_end().ends_with(" DO NOT EDIT."))
}
