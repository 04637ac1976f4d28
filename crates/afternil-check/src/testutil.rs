//! Hand-built trees for shapes the Go front end never produces.

use afternil_ast::*;

/// Builds identifiers and nodes with strictly increasing positions, one per
/// line, so creation order is source order.
pub(crate) struct TreeBuilder {
    idents: Vec<Ident>,
    bindings: Vec<Binding>,
    next_line: u32,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            idents: Vec::new(),
            bindings: Vec::new(),
            next_line: 1,
        }
    }

    fn span(&mut self) -> Span {
        let line = self.next_line;
        self.next_line += 1;
        Span::new(line * 16, line * 16 + 3, line, 2)
    }

    pub(crate) fn binding(&mut self, name: &str, kind: BindingKind) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding {
            name: name.to_string(),
            kind,
            decl: None,
        });
        id
    }

    pub(crate) fn ident(&mut self, name: &str, binding: Option<BindingId>) -> Expr {
        let span = self.span();
        let id = IdentId(self.idents.len() as u32);
        self.idents.push(Ident {
            name: name.to_string(),
            binding,
            span,
        });
        Expr {
            kind: ExprKind::Ident(id),
            span,
        }
    }

    pub(crate) fn nil(&mut self) -> Expr {
        self.ident(NIL, None)
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr {
            span: lhs.span,
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    pub(crate) fn ne(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Ne, lhs, rhs)
    }

    pub(crate) fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        Expr {
            span: operand.span,
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        }
    }

    pub(crate) fn paren(&mut self, inner: Expr) -> Expr {
        Expr {
            span: inner.span,
            kind: ExprKind::Paren(Box::new(inner)),
        }
    }

    pub(crate) fn call(&mut self, func: &str, args: Vec<Expr>) -> Expr {
        let func = self.ident(func, None);
        Expr {
            span: func.span,
            kind: ExprKind::Call {
                func: Box::new(func),
                args,
            },
        }
    }

    pub(crate) fn call_stmt(&mut self, func: &str, args: Vec<Expr>) -> Stmt {
        let call = self.call(func, args);
        self.stmt(StmtKind::Expr(call))
    }

    pub(crate) fn ret(&mut self, values: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(values))
    }

    pub(crate) fn assign(&mut self, lhs: Vec<Expr>, op: AssignOp, rhs: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Assign(AssignStmt { lhs, op, rhs }))
    }

    pub(crate) fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let span = self.span();
        Stmt { kind, span }
    }

    pub(crate) fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        let span = stmts.first().map(|s| s.span).unwrap_or_else(|| self.span());
        Block { stmts, span }
    }

    pub(crate) fn if_stmt(&mut self, cond: Expr, body: Vec<Stmt>, else_clause: Option<Stmt>) -> Stmt {
        let body = self.block(body);
        let span = cond.span;
        Stmt {
            kind: StmtKind::If(Box::new(IfStmt {
                init: None,
                cond,
                body,
                else_clause,
            })),
            span,
        }
    }

    /// Guard `if <ident> != nil { return }` on `binding`.
    pub(crate) fn guard(&mut self, name: &str, binding: BindingId) -> Stmt {
        let lhs = self.ident(name, Some(binding));
        let rhs = self.nil();
        let cond = self.ne(lhs, rhs);
        let ret = self.ret(vec![]);
        self.if_stmt(cond, vec![ret], None)
    }

    pub(crate) fn finish(self) -> SourceFile {
        self.finish_with(Vec::new())
    }

    /// A file with one function whose body is `stmts`.
    pub(crate) fn finish_with(self, stmts: Vec<Stmt>) -> SourceFile {
        let decls = if stmts.is_empty() {
            Vec::new()
        } else {
            vec![Decl::Func(FuncDecl {
                name: "f".into(),
                body: Some(Block {
                    span: stmts[0].span,
                    stmts,
                }),
                span: Span::dummy(),
            })]
        };
        SourceFile {
            path: "built.go".into(),
            source: String::new(),
            decls,
            idents: self.idents,
            bindings: self.bindings,
        }
    }
}
