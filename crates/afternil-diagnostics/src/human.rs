//! Pretty terminal output.
//!
//! Uses ariadne for rich terminal output with source context.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::diagnostic::{Diagnostic, Severity};
use crate::plain::{source_text, SourceMap};

/// Format diagnostics as ariadne reports followed by a summary line.
pub fn format_pretty(diags: &[Diagnostic], sources: &SourceMap, use_color: bool) -> String {
    if diags.is_empty() {
        return "No issues found\n".to_string();
    }

    let mut output = Vec::new();
    let config = Config::default()
        .with_color(use_color)
        .with_index_type(IndexType::Byte);

    for diag in diags {
        let file = diag.location.file.as_str();
        let text = source_text(sources, file);
        if text.is_empty() {
            output.push(format_fallback(diag));
            continue;
        }

        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
        };

        let start = line_col_to_offset(&text, diag.location.line, diag.location.column);
        let end = line_col_to_offset(&text, diag.location.end_line, diag.location.end_column)
            .max(start + 1)
            .min(text.len());

        let mut report = Report::build(kind, (file, start..end))
            .with_config(config)
            .with_code(&diag.rule)
            .with_message(&diag.title)
            .with_label(
                Label::new((file, start..end))
                    .with_message(&diag.explanation)
                    .with_color(color),
            );

        if let Some(ref root_cause) = diag.root_cause {
            report = report.with_note(format!(
                "{} (line {})",
                root_cause.description, root_cause.line
            ));
        }
        if let Some(ref fix) = diag.fix {
            report = report.with_help(&fix.description);
        }

        let mut buf = Vec::new();
        report
            .finish()
            .write((file, Source::from(&*text)), &mut buf)
            .ok();

        output.push(String::from_utf8_lossy(&buf).to_string());
    }

    let files = {
        let mut files: Vec<&str> = diags.iter().map(|d| d.location.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files.len()
    };
    output.push(format!(
        "\nFound {} reference(s) after nil check in {} file(s)\n",
        diags.len(),
        files,
    ));

    output.join("\n")
}

/// Convert 1-based line:column to byte offset in source text.
fn line_col_to_offset(source: &str, line: u32, col: u32) -> usize {
    let line = line.saturating_sub(1) as usize;
    let col = col.saturating_sub(1) as usize;

    let offset: usize = source
        .split_inclusive('\n')
        .take(line)
        .map(str::len)
        .sum();

    (offset + col).min(source.len().saturating_sub(1))
}

/// Used when the source file is not available.
fn format_fallback(diag: &Diagnostic) -> String {
    format!(
        "{}: {} [{}] {}: {}\n",
        diag.location, diag.severity, diag.rule, diag.title, diag.explanation,
    )
}
