//! Order-sensitive write/read tracking over a guard's remainder.
//!
//! The first remainder statement that writes the guarded variable ends the
//! walk with no result. The first statement that reads it ends the walk
//! with every read in that statement.

use afternil_ast::visit::{walk_expr, walk_stmt, Visitor};
use afternil_ast::{BindingId, Expr, ExprKind, IdentId, SourceFile, Span, Stmt, StmtKind, UnaryOp};

use crate::remainder::GuardMatch;

/// Identifier occurrences flagged for one guard, in traversal order.
pub fn track(file: &SourceFile, guard: &GuardMatch<'_>) -> Vec<IdentId> {
    for stmt in &guard.remainder {
        if writes(file, guard.binding, stmt) {
            tracing::trace!(line = stmt.span.line, "guarded variable reassigned");
            return Vec::new();
        }
        let refs = references(file, guard.binding, stmt);
        if !refs.is_empty() {
            return refs;
        }
    }
    Vec::new()
}

/// Whether `stmt` takes the address of, or assigns to, the binding.
pub fn writes(file: &SourceFile, binding: BindingId, stmt: &Stmt) -> bool {
    let mut finder = WriteFinder {
        file,
        binding,
        found: false,
    };
    finder.visit_stmt(stmt);
    finder.found
}

/// Every occurrence of the binding in `stmt`.
pub fn references(file: &SourceFile, binding: BindingId, stmt: &Stmt) -> Vec<IdentId> {
    let mut collector = RefCollector {
        file,
        binding,
        refs: Vec::new(),
    };
    collector.visit_stmt(stmt);
    collector.refs
}

/// Arguments of `go func() {...}(args)` or `defer func() {...}(args)`.
///
/// The literal's body runs after the surrounding code, so only the
/// arguments are evaluated in place.
fn deferred_closure_args(stmt: &Stmt) -> Option<&[Expr]> {
    let (StmtKind::Go(call) | StmtKind::Defer(call)) = &stmt.kind else {
        return None;
    };
    match &call.kind {
        ExprKind::Call { func, args } if matches!(func.kind, ExprKind::FuncLit(_)) => Some(args),
        _ => None,
    }
}

struct WriteFinder<'a> {
    file: &'a SourceFile,
    binding: BindingId,
    found: bool,
}

impl WriteFinder<'_> {
    fn is_target(&self, expr: &Expr) -> bool {
        matches!(expr.kind, ExprKind::Ident(id) if self.file.refers_to(id, self.binding))
    }
}

impl Visitor for WriteFinder<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.found {
            return;
        }
        if let StmtKind::Assign(assign) = &stmt.kind {
            if assign.lhs.iter().any(|lhs| self.is_target(lhs)) {
                self.found = true;
                return;
            }
        }
        match deferred_closure_args(stmt) {
            Some(args) => args.iter().for_each(|arg| self.visit_expr(arg)),
            None => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if let ExprKind::Unary {
            op: UnaryOp::Addr,
            operand,
        } = &expr.kind
        {
            if self.is_target(operand) {
                self.found = true;
                return;
            }
        }
        walk_expr(self, expr);
    }
}

struct RefCollector<'a> {
    file: &'a SourceFile,
    binding: BindingId,
    refs: Vec<IdentId>,
}

impl Visitor for RefCollector<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match deferred_closure_args(stmt) {
            Some(args) => args.iter().for_each(|arg| self.visit_expr(arg)),
            None => walk_stmt(self, stmt),
        }
    }

    fn visit_ident(&mut self, id: IdentId, _span: Span) {
        if self.file.refers_to(id, self.binding) {
            self.refs.push(id);
        }
    }
}
