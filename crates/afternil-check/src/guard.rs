//! Guard recognition: `if v != nil { ...; return ... }`.

use afternil_ast::{BinaryOp, BindingId, Block, ExprKind, IdentId, IfStmt, SourceFile, StmtKind};

use crate::error::ConsistencyFault;

/// Whether the block ends in a `return`. Only the last statement counts;
/// `panic`, `goto` and friends are not terminal.
pub fn is_terminal(body: &Block) -> bool {
    matches!(
        body.stmts.last().map(|s| &s.kind),
        Some(StmtKind::Return(_))
    )
}

/// Classify an if-statement.
///
/// Returns the guarded binding for `v != nil` / `nil != v` with a terminal
/// body, `None` for any other shape.
pub fn classify(file: &SourceFile, stmt: &IfStmt) -> Result<Option<BindingId>, ConsistencyFault> {
    if !is_terminal(&stmt.body) {
        return Ok(None);
    }
    let ExprKind::Binary {
        op: BinaryOp::Ne,
        lhs,
        rhs,
    } = &stmt.cond.kind
    else {
        return Ok(None);
    };
    let (ExprKind::Ident(left), ExprKind::Ident(right)) = (&lhs.kind, &rhs.kind) else {
        return Ok(None);
    };

    let (var, nil) = match (
        file.ident(*left).is_nil_literal(),
        file.ident(*right).is_nil_literal(),
    ) {
        (false, true) => (*left, *right),
        (true, false) => (*right, *left),
        _ => return Ok(None),
    };

    check_nil_side(file, nil)?;
    let ident = file.ident(var);
    match ident.binding {
        Some(binding) => Ok(Some(binding)),
        None => Err(ConsistencyFault::GuardVariableUnbound {
            name: ident.name.clone(),
            path: file.path.clone(),
            line: ident.span.line,
            column: ident.span.column,
        }),
    }
}

fn check_nil_side(file: &SourceFile, nil: IdentId) -> Result<(), ConsistencyFault> {
    let ident = file.ident(nil);
    if ident.binding.is_some() {
        return Err(ConsistencyFault::NilLiteralBound {
            path: file.path.clone(),
            line: ident.span.line,
            column: ident.span.column,
        });
    }
    Ok(())
}
