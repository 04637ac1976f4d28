//! Comment-based suppression: `// afternil:ignore` on the flagged line.

use afternil_ast::SourceFile;
use afternil_check::Failure;

/// Whether `line` has a `//` comment containing `marker`.
pub fn is_suppressed_line(line: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    line_comment_start(line).is_some_and(|start| line[start..].contains(marker))
}

/// Byte offset of the `//` that opens a line comment, skipping string
/// and rune literals. A raw string continued from an earlier line is not
/// tracked.
fn line_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'`') if b == b'`' => quote = None,
            Some(q) if q != b'`' && b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Drop failures whose source line carries the suppression marker.
pub fn filter_suppressed(file: &SourceFile, failures: Vec<Failure>, marker: &str) -> Vec<Failure> {
    let before = failures.len();
    let kept: Vec<Failure> = failures
        .into_iter()
        .filter(|f| {
            !file
                .line_text(f.line)
                .is_some_and(|line| is_suppressed_line(line, marker))
        })
        .collect();
    if kept.len() != before {
        tracing::debug!(
            path = %file.path,
            suppressed = before - kept.len(),
            "dropped suppressed findings"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use afternil_ast::parse_go;
    use afternil_check::analyze;

    const MARKER: &str = "afternil:ignore";

    #[test]
    fn test_marker_must_be_in_a_comment() {
        assert!(is_suppressed_line("\treturn err // afternil:ignore", MARKER));
        assert!(is_suppressed_line("\treturn err //afternil:ignore intentional", MARKER));
        assert!(!is_suppressed_line("\tlog(\"afternil:ignore\", err)", MARKER));
        assert!(!is_suppressed_line("\treturn err", MARKER));
        assert!(!is_suppressed_line("\treturn err // anything", ""));
    }

    #[test]
    fn test_slashes_inside_literals_are_not_comments() {
        assert!(!is_suppressed_line(
            "\tfetch(\"http://host/afternil:ignore\", err)",
            MARKER
        ));
        assert!(!is_suppressed_line("\tfetch(`file://afternil:ignore`, err)", MARKER));
        assert!(!is_suppressed_line("\tlog(\"a\\\"//afternil:ignore\", err)", MARKER));
        assert!(is_suppressed_line(
            "\tfetch(\"http://host\", err) // afternil:ignore",
            MARKER
        ));
        assert!(is_suppressed_line("\tsplit('/', err) // afternil:ignore", MARKER));
        assert!(is_suppressed_line("\tlog(`raw`, err) //afternil:ignore", MARKER));
    }

    #[test]
    fn test_filter_suppressed() {
        let src = r#"package p

func f(err error) error {
	if err != nil {
		return err
	}
	log(err) // afternil:ignore
	return err
}

func g(err error) error {
	if err != nil {
		return err
	}
	return err
}
"#;
        let file = parse_go(src, "p.go").unwrap();
        let failures = analyze(&file).unwrap();
        assert_eq!(failures.len(), 2);
        let kept = filter_suppressed(&file, failures, MARKER);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].line, 15);
    }
}
