//! Go source parsing via tree-sitter-go.
//!
//! Parses Go source into a tree-sitter CST, rejects trees with syntax errors,
//! and lowers the rest into a resolved [`SourceFile`].

use tree_sitter::{Language, Node, Parser};

use crate::ast::SourceFile;
use crate::lower::Lowerer;

/// Errors that can occur during parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to initialize parser: {0}")]
    InitError(String),
    #[error("failed to parse {path}")]
    ParseFailed { path: String },
    #[error("{path}:{line}:{column}: syntax error")]
    Syntax {
        path: String,
        line: u32,
        column: u32,
    },
}

/// Initialize a tree-sitter parser for Go.
fn create_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_go::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::InitError(e.to_string()))?;
    Ok(parser)
}

/// Parse and resolve one Go source file.
pub fn parse_go(source: &str, path: &str) -> Result<SourceFile, ParseError> {
    let mut parser = create_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::ParseFailed {
            path: path.to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let at = first_error(root).unwrap_or(root);
        let pos = at.start_position();
        return Err(ParseError::Syntax {
            path: path.to_string(),
            line: pos.row as u32 + 1,
            column: pos.column as u32 + 1,
        });
    }

    let mut lowerer = Lowerer::new(source);
    let decls = lowerer.lower_file(root);
    let (idents, bindings) = lowerer.finish();
    tracing::trace!(
        path,
        decls = decls.len(),
        idents = idents.len(),
        bindings = bindings.len(),
        "lowered Go file"
    );

    Ok(SourceFile {
        path: path.to_string(),
        source: source.to_string(),
        decls,
        idents,
        bindings,
    })
}

/// First ERROR or MISSING node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
