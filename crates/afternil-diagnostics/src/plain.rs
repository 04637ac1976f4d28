//! Line-oriented output: the classic text report, machine positions and JSON.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::diagnostic::Diagnostic;

/// Source text by file path, as analyzed. Files missing from the map are
/// read from disk.
pub type SourceMap = HashMap<String, String>;

pub(crate) fn source_text<'a>(sources: &'a SourceMap, file: &str) -> Cow<'a, str> {
    match sources.get(file) {
        Some(text) => Cow::Borrowed(text.as_str()),
        None => Cow::Owned(std::fs::read_to_string(file).unwrap_or_default()),
    }
}

/// `Reference after nil check at FILE:LINE:COL` followed by up to
/// `context_lines` source lines ending at the flagged line.
pub fn format_text(diags: &[Diagnostic], sources: &SourceMap, context_lines: usize) -> String {
    let mut out = String::new();
    let mut cache: HashMap<&str, Cow<'_, str>> = HashMap::new();
    for diag in diags {
        out.push_str(&format!("Reference after nil check at {}\n", diag.location));
        if context_lines == 0 {
            continue;
        }
        let file = diag.location.file.as_str();
        let text = cache
            .entry(file)
            .or_insert_with(|| source_text(sources, file));
        let last = diag.location.line as usize;
        let first = last.saturating_sub(context_lines - 1).max(1);
        for line in text.lines().skip(first - 1).take(last + 1 - first) {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// One `FILE:LINE:COL` per diagnostic.
pub fn format_machine(diags: &[Diagnostic]) -> String {
    diags
        .iter()
        .map(|d| format!("{}\n", d.location))
        .collect()
}

/// Pretty-printed JSON array of diagnostics.
pub fn format_json(diags: &[Diagnostic]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(diags)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticBuilder, DiagnosticSource, Severity};

    const SRC: &str = "package p\n\nfunc f(err error) error {\n\tif err != nil {\n\t\treturn err\n\t}\n\treturn err\n}\n";

    fn diag(file: &str, line: u32, column: u32) -> Diagnostic {
        DiagnosticBuilder::new(
            "REF001",
            Severity::Error,
            "reference after nil check",
            DiagnosticSource::RefAfterNil,
        )
        .location(file, line, column)
        .build()
    }

    fn sources() -> SourceMap {
        let mut map = SourceMap::new();
        map.insert("p.go".to_string(), SRC.to_string());
        map
    }

    #[test]
    fn test_text_single_context_line() {
        let out = format_text(&[diag("p.go", 7, 9)], &sources(), 1);
        assert_eq!(out, "Reference after nil check at p.go:7:9\n\treturn err\n");
    }

    #[test]
    fn test_text_more_context() {
        let out = format_text(&[diag("p.go", 7, 9)], &sources(), 3);
        insta::assert_snapshot!(out.replace('\t', "    "), @r"
        Reference after nil check at p.go:7:9
                return err
            }
            return err
        ");
    }

    #[test]
    fn test_text_without_context_and_missing_source() {
        let out = format_text(&[diag("p.go", 7, 9)], &sources(), 0);
        assert_eq!(out, "Reference after nil check at p.go:7:9\n");
        let out = format_text(&[diag("/nonexistent/q.go", 2, 1)], &sources(), 1);
        assert_eq!(out, "Reference after nil check at /nonexistent/q.go:2:1\n");
    }

    #[test]
    fn test_context_clamps_at_file_start() {
        let out = format_text(&[diag("p.go", 1, 1)], &sources(), 5);
        assert_eq!(out, "Reference after nil check at p.go:1:1\npackage p\n");
    }

    #[test]
    fn test_machine() {
        let out = format_machine(&[diag("a.go", 12, 15), diag("b.go", 8, 9)]);
        assert_eq!(out, "a.go:12:15\nb.go:8:9\n");
        assert_eq!(format_machine(&[]), "");
    }

    #[test]
    fn test_json_array() {
        let out = format_json(&[diag("a.go", 12, 15)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["location"]["column"], 15);
        assert_eq!(format_json(&[]).unwrap(), "[]\n");
    }
}
