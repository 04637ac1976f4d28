//! Core diagnostic types for afternil.
//!
//! The analyzer produces `Diagnostic` values, and all formatters (text,
//! machine, JSON, pretty) consume them.

use serde::{Deserialize, Serialize};

/// A diagnostic produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique ID: RULE_CODE-file:line:column (e.g., "REF001-handler.go:18:9").
    pub id: String,
    /// Rule code (e.g., "REF001").
    pub rule: String,
    pub severity: Severity,
    /// One-line summary.
    pub title: String,
    /// Detailed explanation of why this is a bug.
    pub explanation: String,
    /// The flagged identifier.
    pub location: Location,
    /// The nil guard that makes the identifier provably nil.
    pub root_cause: Option<RootCause>,
    /// Auto-fix suggestion.
    pub fix: Option<Fix>,
    /// The analysis pass that produced this diagnostic.
    pub source: DiagnosticSource,
}

/// REF001 findings are always errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
///
/// Lines and columns are 1-based; columns count bytes, like Go's
/// `token.Position.Column`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub file: String,
    pub line: u32,
    pub description: String,
}

/// Auto-fix suggestion with exact text edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub description: String,
    pub edits: Vec<Edit>,
}

/// A whole-line text edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub file: String,
    pub range: EditRange,
    /// The original text (for verification).
    pub old_text: Option<String>,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRange {
    pub start_line: u32,
    pub end_line: u32,
}

/// Which analysis pass produced the diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSource {
    /// Reference after a terminal nil guard.
    RefAfterNil,
}

impl std::fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefAfterNil => write!(f, "refafternil"),
        }
    }
}

/// Builder for creating diagnostics conveniently.
pub struct DiagnosticBuilder {
    rule: String,
    severity: Severity,
    title: String,
    file: String,
    line: u32,
    column: u32,
    end_line: u32,
    end_column: u32,
    source: DiagnosticSource,
    explanation: String,
    root_cause: Option<RootCause>,
    fix: Option<Fix>,
}

impl DiagnosticBuilder {
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        source: DiagnosticSource,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            title: title.into(),
            file: String::new(),
            line: 0,
            column: 0,
            end_line: 0,
            end_column: 0,
            source,
            explanation: String::new(),
            root_cause: None,
            fix: None,
        }
    }

    /// Set the location. The end defaults to the start.
    pub fn location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self.column = column;
        self.end_line = line;
        self.end_column = column;
        self
    }

    pub fn end_location(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn root_cause(
        mut self,
        file: impl Into<String>,
        line: u32,
        description: impl Into<String>,
    ) -> Self {
        self.root_cause = Some(RootCause {
            file: file.into(),
            line,
            description: description.into(),
        });
        self
    }

    pub fn fix(mut self, description: impl Into<String>, edits: Vec<Edit>) -> Self {
        self.fix = Some(Fix {
            description: description.into(),
            edits,
        });
        self
    }

    pub fn build(self) -> Diagnostic {
        let id = format!("{}-{}:{}:{}", self.rule, self.file, self.line, self.column);
        Diagnostic {
            id,
            rule: self.rule,
            severity: self.severity,
            title: self.title,
            explanation: self.explanation,
            location: Location {
                file: self.file,
                line: self.line,
                column: self.column,
                end_line: self.end_line,
                end_column: self.end_column,
            },
            root_cause: self.root_cause,
            fix: self.fix,
            source: self.source,
        }
    }
}

/// Summary of analysis results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub files_checked: usize,
    pub files_with_issues: usize,
    pub error: usize,
    pub fix_available: usize,
    pub analysis_time_ms: u64,
}

impl AnalysisSummary {
    /// Create a summary from a list of diagnostics.
    pub fn from_diagnostics(
        diagnostics: &[Diagnostic],
        files_checked: usize,
        analysis_time_ms: u64,
    ) -> Self {
        let mut summary = Self {
            files_checked,
            analysis_time_ms,
            ..Self::default()
        };

        let mut files: Vec<&str> = Vec::new();
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => summary.error += 1,
            }
            if diag.fix.is_some() {
                summary.fix_available += 1;
            }
            if !files.contains(&diag.location.file.as_str()) {
                files.push(&diag.location.file);
            }
        }
        summary.files_with_issues = files.len();

        summary
    }

    /// Total number of diagnostics.
    pub fn total(&self) -> usize {
        self.error
    }
}
