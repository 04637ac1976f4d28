//! REF001: reference after nil check.

use afternil_ast::{SourceFile, NIL};
use afternil_diagnostics::diagnostic::*;
use afternil_diagnostics::rules::REF001;

use crate::scanner::Failure;

pub fn build_ref001(failure: &Failure, file: &SourceFile) -> Diagnostic {
    let name = &failure.name;
    let end_column = failure.column + (failure.span.end - failure.span.start);
    let mut builder = DiagnosticBuilder::new(
        REF001,
        Severity::Error,
        "reference after nil check",
        DiagnosticSource::RefAfterNil,
    )
    .location(&failure.file, failure.line, failure.column)
    .end_location(failure.line, end_column)
    .explanation(format!(
        "`{name}` is always nil here: the check at line {} returns whenever it is not",
        failure.guard.line
    ))
    .root_cause(
        &failure.file,
        failure.guard.line,
        format!("guard `if {name} != nil` ends in a return"),
    );

    if let Some(edit) = line_edit(failure, file) {
        builder = builder.fix(format!("Replace `{name}` with `nil`"), vec![edit]);
    }
    builder.build()
}

/// The flagged line with the occurrence replaced by `nil`.
fn line_edit(failure: &Failure, file: &SourceFile) -> Option<Edit> {
    let old = file.line_text(failure.line)?;
    let start = failure.column.checked_sub(1)? as usize;
    let end = start + (failure.span.end - failure.span.start) as usize;
    let new_text = format!("{}{NIL}{}", old.get(..start)?, old.get(end..)?);
    Some(Edit {
        file: failure.file.clone(),
        range: EditRange {
            start_line: failure.line,
            end_line: failure.line,
        },
        old_text: Some(old.to_string()),
        new_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use afternil_ast::parse_go;

    #[test]
    fn test_build_ref001() {
        let src = "package p\n\nfunc f(err error) error {\n\tif err != nil {\n\t\treturn err\n\t}\n\treturn err\n}\n";
        let file = parse_go(src, "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        let diag = build_ref001(&failures[0], &file);

        assert_eq!(diag.id, "REF001-p.go:7:9");
        assert_eq!(diag.location.end_column, 12);
        assert_eq!(diag.root_cause.as_ref().map(|r| r.line), Some(4));
        let fix = diag.fix.unwrap();
        assert_eq!(fix.edits[0].old_text.as_deref(), Some("\treturn err"));
        assert_eq!(fix.edits[0].new_text, "\treturn nil");
        insta::assert_snapshot!(diag.explanation, @"`err` is always nil here: the check at line 4 returns whenever it is not");
    }
}
