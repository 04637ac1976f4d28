//! Analysis orchestrator: discovers files, runs the checker on each one in
//! parallel, and in fix mode writes the rewritten sources back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use afternil_ast::{parse_go, ParseError};
use afternil_check::{analyze, apply_fix, ConsistencyFault, RefAnalyzer};
use afternil_diagnostics::diagnostic::{AnalysisSummary, Diagnostic};
use afternil_diagnostics::plain::SourceMap;
use rayon::prelude::*;

use crate::config::Config;
use crate::discover::{expand_paths, is_generated};
use crate::suppress::filter_suppressed;

/// Complete output from a run.
#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub summary: AnalysisSummary,
    /// Text each diagnostic was computed against, before any fix.
    pub sources: SourceMap,
    /// Files rewritten in fix mode, with the number of occurrences replaced.
    pub fixed: Vec<(String, usize)>,
}

impl CheckOutput {
    /// Total occurrences rewritten to nil.
    pub fn fixed_total(&self) -> usize {
        self.fixed.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("{path}: no such file or directory")]
    Missing { path: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("internal consistency fault: {0}")]
    Fault(#[from] ConsistencyFault),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix,
}

/// Result of checking one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Rewritten text when fix mode replaced anything.
    pub fixed: Option<(String, usize)>,
    pub skipped: bool,
}

/// Check every Go file named by `paths` without modifying anything.
pub fn check_paths(paths: &[String], config: &Config) -> Result<CheckOutput, OrchestratorError> {
    run(paths, config, Mode::Check)
}

/// Check `paths` and rewrite every flagged occurrence to `nil` in place.
///
/// The returned diagnostics describe what was fixed.
pub fn fix_paths(paths: &[String], config: &Config) -> Result<CheckOutput, OrchestratorError> {
    run(paths, config, Mode::Fix)
}

fn run(paths: &[String], config: &Config, mode: Mode) -> Result<CheckOutput, OrchestratorError> {
    let start = Instant::now();
    let files = expand_paths(paths, config.afternil.include_tests)?;

    let reports = files
        .par_iter()
        .map(|path| process_file(path, config, mode))
        .collect::<Result<Vec<_>, _>>()?;

    let mut diagnostics = Vec::new();
    let mut sources = SourceMap::new();
    let mut fixed = Vec::new();
    let mut files_checked = 0;
    for report in reports {
        if report.skipped {
            continue;
        }
        files_checked += 1;
        diagnostics.extend(report.diagnostics);
        if let Some((_, count)) = report.fixed {
            fixed.push((report.path.clone(), count));
        }
        sources.insert(report.path, report.source);
    }

    diagnostics.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
    });

    let elapsed = start.elapsed().as_millis() as u64;
    let summary = AnalysisSummary::from_diagnostics(&diagnostics, files_checked, elapsed);
    tracing::info!(
        files = summary.files_checked,
        findings = summary.total(),
        fixed = fixed.len(),
        elapsed_ms = elapsed,
        "analysis complete"
    );

    Ok(CheckOutput {
        diagnostics,
        summary,
        sources,
        fixed,
    })
}

fn process_file(path: &Path, config: &Config, mode: Mode) -> Result<FileReport, OrchestratorError> {
    let file_name = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|source| OrchestratorError::Read {
        path: file_name.clone(),
        source,
    })?;

    let report = check_source(&file_name, source, config, mode == Mode::Fix)?;
    if let Some((text, count)) = &report.fixed {
        write_atomic(path, text)?;
        tracing::info!(path = %file_name, replaced = count, "rewrote file");
    }
    Ok(report)
}

/// Run the pipeline on in-memory source. With `fix`, the rewritten text is
/// returned in [`FileReport::fixed`] but nothing is written.
///
/// Fixing repeats analysis on the rewritten tree until nothing is flagged,
/// so the reported diagnostics cover every occurrence that was replaced.
pub fn check_source(
    path: &str,
    source: String,
    config: &Config,
    fix: bool,
) -> Result<FileReport, OrchestratorError> {
    let mut report = FileReport {
        path: path.to_string(),
        source,
        diagnostics: Vec::new(),
        fixed: None,
        skipped: false,
    };
    if config.afternil.skip_generated && is_generated(&report.source) {
        tracing::debug!(path, "skipping generated file");
        report.skipped = true;
        return Ok(report);
    }

    tracing::info!(path, "checking file");
    let marker = &config.afternil.suppress_marker;
    let mut file = parse_go(&report.source, path)?;
    let mut failures = filter_suppressed(&file, analyze(&file)?, marker);
    report.diagnostics = RefAnalyzer::diagnostics(&file, &failures);
    if !fix || failures.is_empty() {
        return Ok(report);
    }

    // A guard reports only its first reading statement; later reads show
    // up once the earlier ones are rewritten.
    let mut replaced = 0;
    let mut passes = 0;
    while !failures.is_empty() {
        let count = apply_fix(&mut file, failures);
        if count == 0 {
            break;
        }
        replaced += count;
        passes += 1;
        failures = filter_suppressed(&file, analyze(&file)?, marker);
        report
            .diagnostics
            .extend(RefAnalyzer::diagnostics(&file, &failures));
    }
    report
        .diagnostics
        .sort_by_key(|d| (d.location.line, d.location.column));
    tracing::debug!(path, passes, replaced, "fixed file");
    report.fixed = Some((file.render(), replaced));
    Ok(report)
}

/// Replace `path` with `contents` via a temp file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> Result<(), OrchestratorError> {
    let write_err = |source: std::io::Error| OrchestratorError::Write {
        path: path.display().to_string(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
