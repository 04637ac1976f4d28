//! Pre-order traversal of the analysis tree.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to descend. Not calling it prunes the subtree.

use crate::ast::*;

pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// A `case`/`default` clause of a switch or select.
    fn visit_clause(&mut self, clause: &CaseClause) {
        walk_clause(self, clause);
    }

    fn visit_ident(&mut self, _id: IdentId, _span: Span) {}
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::If(if_stmt) => {
            if let Some(init) = &if_stmt.init {
                v.visit_stmt(init);
            }
            v.visit_expr(&if_stmt.cond);
            v.visit_block(&if_stmt.body);
            if let Some(else_clause) = &if_stmt.else_clause {
                v.visit_stmt(else_clause);
            }
        }
        StmtKind::Return(values) | StmtKind::Opaque(values) => {
            for value in values {
                v.visit_expr(value);
            }
        }
        StmtKind::Assign(assign) => {
            for expr in assign.lhs.iter().chain(&assign.rhs) {
                v.visit_expr(expr);
            }
        }
        StmtKind::IncDec { target, .. } => v.visit_expr(target),
        StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => v.visit_expr(expr),
        StmtKind::Send { channel, value } => {
            v.visit_expr(channel);
            v.visit_expr(value);
        }
        StmtKind::VarDecl(specs) => {
            for spec in specs {
                for name in &spec.names {
                    v.visit_ident(*name, stmt.span);
                }
                for value in &spec.values {
                    v.visit_expr(value);
                }
            }
        }
        StmtKind::For(for_stmt) => {
            if let Some(init) = &for_stmt.init {
                v.visit_stmt(init);
            }
            if let Some(cond) = &for_stmt.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &for_stmt.post {
                v.visit_stmt(post);
            }
            v.visit_block(&for_stmt.body);
        }
        StmtKind::Range(range) => {
            for target in range.key.iter().chain(&range.value) {
                v.visit_expr(target);
            }
            v.visit_expr(&range.expr);
            v.visit_block(&range.body);
        }
        StmtKind::Switch(switch) => {
            if let Some(init) = &switch.init {
                v.visit_stmt(init);
            }
            if let Some(alias) = switch.alias {
                v.visit_ident(alias, stmt.span);
            }
            if let Some(tag) = &switch.tag {
                v.visit_expr(tag);
            }
            for clause in &switch.clauses {
                v.visit_clause(clause);
            }
        }
        StmtKind::Select(clauses) => {
            for clause in clauses {
                v.visit_clause(clause);
            }
        }
        StmtKind::Labeled { stmt, .. } => v.visit_stmt(stmt),
        StmtKind::Branch(_) | StmtKind::Empty => {}
    }
}

pub fn walk_clause<V: Visitor + ?Sized>(v: &mut V, clause: &CaseClause) {
    for value in &clause.values {
        v.visit_expr(value);
    }
    if let Some(comm) = &clause.comm {
        v.visit_stmt(comm);
    }
    v.visit_block(&clause.body);
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(id) => v.visit_ident(*id, expr.span),
        ExprKind::Literal(_) => {}
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Call { func, args } => {
            v.visit_expr(func);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Selector { operand, .. } => v.visit_expr(operand),
        ExprKind::Paren(inner) => v.visit_expr(inner),
        ExprKind::FuncLit(lit) => v.visit_block(&lit.body),
        ExprKind::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::Other(children) => {
            for child in children {
                v.visit_expr(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_go;

    struct Collect<'a> {
        file: &'a SourceFile,
        names: Vec<String>,
    }

    impl Visitor for Collect<'_> {
        fn visit_ident(&mut self, id: IdentId, _span: Span) {
            self.names.push(self.file.ident(id).name.clone());
        }
    }

    struct SkipClosures {
        idents: usize,
    }

    impl Visitor for SkipClosures {
        fn visit_expr(&mut self, expr: &Expr) {
            if matches!(expr.kind, ExprKind::FuncLit(_)) {
                return;
            }
            walk_expr(self, expr);
        }

        fn visit_ident(&mut self, _id: IdentId, _span: Span) {
            self.idents += 1;
        }
    }

    fn body(file: &SourceFile) -> &Block {
        match &file.decls[0] {
            Decl::Func(func) => func.body.as_ref().unwrap(),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_walk_is_pre_order() {
        let src = "package p\n\nfunc f() {\n\tif a := b(c); a != nil {\n\t\td(a)\n\t}\n}\n";
        let file = parse_go(src, "p.go").unwrap();
        let mut collect = Collect {
            file: &file,
            names: Vec::new(),
        };
        collect.visit_block(body(&file));
        assert_eq!(collect.names, vec!["a", "b", "c", "a", "nil", "d", "a"]);
    }

    #[test]
    fn test_overriding_visit_prunes_subtree() {
        let src = "package p\n\nfunc f() {\n\tgo func() {\n\t\tg(x)\n\t}()\n}\n";
        let file = parse_go(src, "p.go").unwrap();
        let mut skip = SkipClosures { idents: 0 };
        skip.visit_block(body(&file));
        assert_eq!(skip.idents, 0);
    }
}
