//! Statements reachable when a guard's condition is false.

use afternil_ast::{BindingId, IfStmt, Span, Stmt};

/// A recognized guard and its remainder, built per candidate if-statement.
#[derive(Debug)]
pub struct GuardMatch<'a> {
    pub binding: BindingId,
    /// Position of the guard condition.
    pub guard: Span,
    /// Else clause first, then every later statement of the enclosing block.
    /// The guard's init statement is never part of it.
    pub remainder: Vec<&'a Stmt>,
}

/// Build the remainder of the guard at `index` in `stmts`.
pub fn build<'a>(binding: BindingId, stmts: &'a [Stmt], index: usize, guard: &'a IfStmt) -> GuardMatch<'a> {
    let following = stmts.get(index + 1..).unwrap_or_default();
    let remainder = guard
        .else_clause
        .iter()
        .chain(following)
        .collect();
    GuardMatch {
        binding,
        guard: guard.cond.span,
        remainder,
    }
}
