//! Rewriting flagged occurrences to the nil literal.

use afternil_ast::{SourceFile, NIL};

use crate::scanner::Failure;

/// Replace every flagged occurrence with `nil`.
///
/// Takes the failures of a finished [`crate::analyze`] run by value, so the
/// tree cannot be mutated while an analysis still borrows it. Returns the
/// number of occurrences rewritten.
pub fn apply_fix(file: &mut SourceFile, failures: Vec<Failure>) -> usize {
    let mut rewritten = 0;
    for failure in failures {
        if file.ident(failure.ident).is_nil_literal() {
            continue;
        }
        file.rewrite_ident(failure.ident, NIL);
        rewritten += 1;
    }
    tracing::debug!(path = %file.path, rewritten, "applied fixes");
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use afternil_ast::parse_go;

    const SRC: &str = r#"package p

import "fmt"

func f(open func() (int, error)) error {
	fd, err := open()
	if err != nil {
		return err
	}
	if fd < 0 {
		// err is nil here
		return fmt.Errorf("bad fd %d: %w", fd, err)
	}
	return err
}
"#;

    #[test]
    fn test_fix_rewrites_only_flagged_occurrences() {
        let mut file = parse_go(SRC, "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(apply_fix(&mut file, failures), 1);
        insta::assert_snapshot!(file.render(), @r#"
        package p

        import "fmt"

        func f(open func() (int, error)) error {
        	fd, err := open()
        	if err != nil {
        		return err
        	}
        	if fd < 0 {
        		// err is nil here
        		return fmt.Errorf("bad fd %d: %w", fd, nil)
        	}
        	return err
        }
        "#);
    }

    #[test]
    fn test_fix_round_trip_until_clean() {
        let mut file = parse_go(SRC, "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        apply_fix(&mut file, failures);
        // The rewritten tree no longer references the guarded variable in the
        // first offending statement, so the next statement is consulted.
        let next = analyze(&file).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].line, 14);

        let mut file = parse_go(&file.render(), "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        assert_eq!(failures.len(), 1);
        apply_fix(&mut file, failures);
        let fixed = parse_go(&file.render(), "p.go").unwrap();
        assert!(analyze(&fixed).unwrap().is_empty());
        assert!(fixed.source.ends_with("\treturn nil\n}\n"));
    }

    #[test]
    fn test_fix_is_noop_for_already_rewritten() {
        let mut file = parse_go(SRC, "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        assert_eq!(apply_fix(&mut file, failures.clone()), 1);
        assert_eq!(apply_fix(&mut file, failures), 0);
    }
}
