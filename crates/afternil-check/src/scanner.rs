//! Whole-file driver: finds every guard and collects its failures.

use serde::Serialize;

use afternil_ast::visit::{walk_block, walk_stmt, Visitor};
use afternil_ast::{BindingId, Block, CaseClause, Decl, IdentId, SourceFile, Span, StmtKind};

use crate::error::ConsistencyFault;
use crate::{guard, remainder, taint};

/// A read of a variable that a preceding guard proved nil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub span: Span,
    /// Flagged occurrence, consumed by [`crate::apply_fix`].
    pub ident: IdentId,
    pub name: String,
    pub binding: BindingId,
    /// Condition of the guard that proved the variable nil.
    pub guard: Span,
}

/// Analyze one file.
///
/// Failures are returned in ascending source position; an occurrence
/// flagged by several guards is reported once.
pub fn analyze(file: &SourceFile) -> Result<Vec<Failure>, ConsistencyFault> {
    let mut scanner = Scanner {
        file,
        failures: Vec::new(),
        fault: None,
    };
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &func.body {
                    scanner.visit_block(body);
                }
            }
            Decl::Var(stmt) => scanner.visit_stmt(stmt),
        }
        if scanner.fault.is_some() {
            break;
        }
    }
    if let Some(fault) = scanner.fault {
        return Err(fault);
    }

    let mut failures = scanner.failures;
    failures.sort_by_key(|f| f.span.start);
    failures.dedup_by_key(|f| f.ident);
    tracing::debug!(path = %file.path, failures = failures.len(), "analyzed file");
    Ok(failures)
}

struct Scanner<'a> {
    file: &'a SourceFile,
    failures: Vec<Failure>,
    fault: Option<ConsistencyFault>,
}

impl Scanner<'_> {
    fn check_guards(&mut self, block: &Block) -> Result<(), ConsistencyFault> {
        for (index, stmt) in block.stmts.iter().enumerate() {
            let StmtKind::If(if_stmt) = &stmt.kind else {
                continue;
            };
            let Some(binding) = guard::classify(self.file, if_stmt)? else {
                continue;
            };
            let matched = remainder::build(binding, &block.stmts, index, if_stmt);
            for ident in taint::track(self.file, &matched) {
                self.failures.push(self.failure(ident, binding, matched.guard));
            }
        }
        Ok(())
    }

    fn failure(&self, id: IdentId, binding: BindingId, guard: Span) -> Failure {
        let ident = self.file.ident(id);
        Failure {
            file: self.file.path.clone(),
            line: ident.span.line,
            column: ident.span.column,
            span: ident.span,
            ident: id,
            name: ident.name.clone(),
            binding,
            guard,
        }
    }
}

impl Visitor for Scanner<'_> {
    fn visit_block(&mut self, block: &Block) {
        if self.fault.is_some() {
            return;
        }
        if let Err(fault) = self.check_guards(block) {
            self.fault = Some(fault);
            return;
        }
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &afternil_ast::Stmt) {
        if self.fault.is_none() {
            walk_stmt(self, stmt);
        }
    }

    /// Clause bodies are bare statement lists, not blocks: guards directly
    /// inside them are not classified, nested blocks still are.
    fn visit_clause(&mut self, clause: &CaseClause) {
        if self.fault.is_some() {
            return;
        }
        for value in &clause.values {
            self.visit_expr(value);
        }
        if let Some(comm) = &clause.comm {
            self.visit_stmt(comm);
        }
        walk_block(self, &clause.body);
    }
}
