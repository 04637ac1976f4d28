//! Go front end for afternil.
//!
//! Parses a Go file with tree-sitter-go and lowers it to a small owned tree
//! in which every identifier occurrence carries the variable it resolves to.
//! The tree can be rewritten in place and printed back with
//! [`SourceFile::render`].

pub mod ast;
pub mod binding;
mod lower;
pub mod parse;
mod render;
pub mod visit;

pub use ast::*;
pub use binding::{Binding, BindingId, BindingKind};
pub use parse::{parse_go, ParseError};
