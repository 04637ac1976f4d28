//! Lowering from the tree-sitter-go CST to the analysis tree, with binding
//! resolution done in the same pass.
//!
//! Resolution follows Go's block scoping: a right-hand side resolves before
//! the names its statement declares, `:=` reuses names already declared in
//! the innermost scope, and function parameters share the body's scope.

use tree_sitter::Node;

use crate::ast::*;
use crate::binding::{Binding, BindingKind, Scopes};

/// Type syntax never contains variable references we care about, but
/// parameter lists inside function types do contain `identifier` nodes.
const OPAQUE_KINDS: &[&str] = &[
    "function_type",
    "struct_type",
    "interface_type",
    "parameter_list",
    "type_parameter_list",
    "type_identifier",
    "field_identifier",
    "package_identifier",
    "label_name",
];

const LITERAL_KINDS: &[&str] = &[
    "true",
    "false",
    "iota",
    "int_literal",
    "float_literal",
    "imaginary_literal",
    "rune_literal",
    "raw_string_literal",
    "interpreted_string_literal",
];

pub(crate) struct Lowerer<'src> {
    source: &'src str,
    scopes: Scopes,
    idents: Vec<Ident>,
}

impl<'src> Lowerer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            scopes: Scopes::new(),
            idents: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> (Vec<Ident>, Vec<Binding>) {
        (self.idents, self.scopes.into_bindings())
    }

    pub(crate) fn lower_file(&mut self, root: Node<'_>) -> Vec<Decl> {
        let items = named_children(root);
        // Package-level names are visible in the whole file, including
        // function bodies that come before the declaration.
        for item in &items {
            self.predeclare(*item);
        }
        let mut decls = Vec::new();
        for item in items {
            match item.kind() {
                "function_declaration" | "method_declaration" => {
                    decls.push(Decl::Func(self.lower_func_decl(item)));
                }
                "var_declaration" | "const_declaration" => {
                    let specs = self.lower_var_specs(item, true);
                    decls.push(Decl::Var(Stmt {
                        kind: StmtKind::VarDecl(specs),
                        span: span_of(item),
                    }));
                }
                _ => {}
            }
        }
        decls
    }

    fn text(&self, node: Node<'_>) -> &'src str {
        let source = self.source;
        &source[node.byte_range()]
    }

    fn predeclare(&mut self, item: Node<'_>) {
        match item.kind() {
            "function_declaration" => {
                if let Some(name) = item.child_by_field_name("name") {
                    let text = self.text(name);
                    self.scopes
                        .declare_package(text, BindingKind::Func, span_of(name));
                }
            }
            "var_declaration" | "const_declaration" => {
                let kind = decl_kind(item);
                for spec in spec_nodes(item) {
                    for name in field_children(spec, "name") {
                        let text = self.text(name);
                        if text != "_" {
                            self.scopes.declare_package(text, kind, span_of(name));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn lower_func_decl(&mut self, node: Node<'_>) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        self.scopes.push();
        if let Some(receiver) = node.child_by_field_name("receiver") {
            self.declare_params(receiver);
        }
        self.declare_signature(node);
        let body = node
            .child_by_field_name("body")
            .map(|b| self.lower_block_in_scope(b));
        self.scopes.pop();
        FuncDecl {
            name,
            body,
            span: span_of(node),
        }
    }

    fn declare_signature(&mut self, node: Node<'_>) {
        if let Some(params) = node.child_by_field_name("parameters") {
            self.declare_params(params);
        }
        if let Some(result) = node.child_by_field_name("result") {
            if result.kind() == "parameter_list" {
                self.declare_params(result);
            }
        }
    }

    fn declare_params(&mut self, list: Node<'_>) {
        for param in named_children(list) {
            for name in field_children(param, "name") {
                self.declare_ident(name, BindingKind::Param);
            }
        }
    }

    // ── identifiers ────────────────────────────────────────────

    fn push_ident(&mut self, name: &str, binding: Option<crate::BindingId>, span: Span) -> IdentId {
        let id = IdentId(self.idents.len() as u32);
        self.idents.push(Ident {
            name: name.to_string(),
            binding,
            span,
        });
        id
    }

    fn declare_ident(&mut self, node: Node<'_>, kind: BindingKind) -> IdentId {
        let name = self.text(node);
        let span = span_of(node);
        if name == "_" {
            return self.push_ident(name, None, span);
        }
        let binding = self.scopes.declare(name, kind, span);
        self.push_ident(name, Some(binding), span)
    }

    fn use_ident(&mut self, node: Node<'_>) -> IdentId {
        let name = self.text(node);
        let span = span_of(node);
        if name == "_" {
            return self.push_ident(name, None, span);
        }
        let binding = self.scopes.resolve(name);
        self.push_ident(name, Some(binding), span)
    }

    /// Left-hand operand of `:=`: reuse a binding of the innermost scope,
    /// declare otherwise.
    fn define_target(&mut self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        if node.kind() != "identifier" {
            return self.lower_expr(node);
        }
        let name = self.text(node);
        let id = match self.scopes.lookup_current(name) {
            Some(existing) if name != "_" => self.push_ident(name, Some(existing), span),
            _ => self.declare_ident(node, BindingKind::Var),
        };
        Expr {
            kind: ExprKind::Ident(id),
            span,
        }
    }

    // ── blocks and statements ──────────────────────────────────

    fn lower_block(&mut self, node: Node<'_>) -> Block {
        self.scopes.push();
        let block = self.lower_block_in_scope(node);
        self.scopes.pop();
        block
    }

    fn lower_block_in_scope(&mut self, node: Node<'_>) -> Block {
        let stmts = statement_nodes(node)
            .into_iter()
            .map(|s| self.lower_stmt(s))
            .collect();
        Block {
            stmts,
            span: span_of(node),
        }
    }

    fn lower_stmt(&mut self, node: Node<'_>) -> Stmt {
        let span = span_of(node);
        let kind = match node.kind() {
            "block" => StmtKind::Block(self.lower_block(node)),
            "if_statement" => StmtKind::If(Box::new(self.lower_if(node))),
            "return_statement" => {
                let values = match named_children(node).first() {
                    Some(list) => self.lower_expr_list(*list),
                    None => Vec::new(),
                };
                StmtKind::Return(values)
            }
            "short_var_declaration" => {
                let rhs = self.lower_field_list(node, "right");
                let lhs = node
                    .child_by_field_name("left")
                    .map(expr_list_nodes)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|n| self.define_target(n))
                    .collect();
                StmtKind::Assign(AssignStmt {
                    lhs,
                    op: AssignOp::Define,
                    rhs,
                })
            }
            "assignment_statement" => {
                let op = match node.child_by_field_name("operator").map(|n| self.text(n)) {
                    Some("=") => AssignOp::Assign,
                    _ => AssignOp::Compound,
                };
                let rhs = self.lower_field_list(node, "right");
                let lhs = self.lower_field_list(node, "left");
                StmtKind::Assign(AssignStmt { lhs, op, rhs })
            }
            "inc_statement" | "dec_statement" => match named_children(node).first() {
                Some(target) => StmtKind::IncDec {
                    target: self.lower_expr(*target),
                    increment: node.kind() == "inc_statement",
                },
                None => StmtKind::Empty,
            },
            "expression_statement" => match named_children(node).first() {
                Some(expr) => StmtKind::Expr(self.lower_expr(*expr)),
                None => StmtKind::Empty,
            },
            "send_statement" => {
                let channel = self.lower_field(node, "channel");
                let value = self.lower_field(node, "value");
                StmtKind::Send { channel, value }
            }
            "receive_statement" => self.lower_receive(node),
            "var_declaration" | "const_declaration" => {
                StmtKind::VarDecl(self.lower_var_specs(node, false))
            }
            "go_statement" | "defer_statement" => match named_children(node).first() {
                Some(call) => {
                    let call = self.lower_expr(*call);
                    if node.kind() == "go_statement" {
                        StmtKind::Go(call)
                    } else {
                        StmtKind::Defer(call)
                    }
                }
                None => StmtKind::Empty,
            },
            "for_statement" => self.lower_for(node),
            "expression_switch_statement" | "type_switch_statement" => {
                StmtKind::Switch(Box::new(self.lower_switch(node)))
            }
            "select_statement" => {
                let clauses = unfielded_named_children(node)
                    .into_iter()
                    .map(|c| self.lower_case(c))
                    .collect();
                StmtKind::Select(clauses)
            }
            "labeled_statement" => {
                let label = node
                    .child_by_field_name("label")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let inner = match unfielded_named_children(node).first() {
                    Some(stmt) => self.lower_stmt(*stmt),
                    None => Stmt {
                        kind: StmtKind::Empty,
                        span,
                    },
                };
                StmtKind::Labeled {
                    label,
                    stmt: Box::new(inner),
                }
            }
            "break_statement" => StmtKind::Branch("break".into()),
            "continue_statement" => StmtKind::Branch("continue".into()),
            "goto_statement" => StmtKind::Branch("goto".into()),
            "fallthrough_statement" => StmtKind::Branch("fallthrough".into()),
            "empty_statement" | "type_declaration" => StmtKind::Empty,
            _ => StmtKind::Opaque(vec![self.lower_expr(node)]),
        };
        Stmt { kind, span }
    }

    fn lower_if(&mut self, node: Node<'_>) -> IfStmt {
        self.scopes.push();
        let init = node
            .child_by_field_name("initializer")
            .map(|n| self.lower_stmt(n));
        let cond = self.lower_field(node, "condition");
        let body = match node.child_by_field_name("consequence") {
            Some(block) => self.lower_block(block),
            None => empty_block(span_of(node)),
        };
        let else_clause = node
            .child_by_field_name("alternative")
            .map(|n| self.lower_stmt(n));
        self.scopes.pop();
        IfStmt {
            init,
            cond,
            body,
            else_clause,
        }
    }

    fn lower_for(&mut self, node: Node<'_>) -> StmtKind {
        self.scopes.push();
        let header = unfielded_named_children(node).into_iter().next();
        let kind = match header {
            Some(clause) if clause.kind() == "range_clause" => {
                let expr = self.lower_field(clause, "right");
                let define = has_token(clause, ":=");
                let mut targets = Vec::new();
                if let Some(left) = clause.child_by_field_name("left") {
                    for target in expr_list_nodes(left) {
                        let lowered = if define && target.kind() == "identifier" {
                            Expr {
                                kind: ExprKind::Ident(self.declare_ident(target, BindingKind::Var)),
                                span: span_of(target),
                            }
                        } else {
                            self.lower_expr(target)
                        };
                        targets.push(lowered);
                    }
                }
                let body = self.lower_body(node);
                let mut targets = targets.into_iter();
                StmtKind::Range(Box::new(RangeStmt {
                    key: targets.next(),
                    value: targets.next(),
                    define,
                    expr,
                    body,
                }))
            }
            Some(clause) if clause.kind() == "for_clause" => {
                let init = clause
                    .child_by_field_name("initializer")
                    .map(|n| self.lower_stmt(n));
                let cond = clause
                    .child_by_field_name("condition")
                    .map(|n| self.lower_expr(n));
                let post = clause
                    .child_by_field_name("update")
                    .map(|n| self.lower_stmt(n));
                let body = self.lower_body(node);
                StmtKind::For(Box::new(ForStmt {
                    init,
                    cond,
                    post,
                    body,
                }))
            }
            header => {
                let cond = header.map(|n| self.lower_expr(n));
                let body = self.lower_body(node);
                StmtKind::For(Box::new(ForStmt {
                    init: None,
                    cond,
                    post: None,
                    body,
                }))
            }
        };
        self.scopes.pop();
        kind
    }

    fn lower_body(&mut self, node: Node<'_>) -> Block {
        match node.child_by_field_name("body") {
            Some(body) => self.lower_block(body),
            None => empty_block(span_of(node)),
        }
    }

    fn lower_switch(&mut self, node: Node<'_>) -> SwitchStmt {
        self.scopes.push();
        let init = node
            .child_by_field_name("initializer")
            .map(|n| self.lower_stmt(n));
        let tag = node
            .child_by_field_name("value")
            .map(|n| self.lower_expr(n));
        let alias = node
            .child_by_field_name("alias")
            .and_then(|list| expr_list_nodes(list).into_iter().next())
            .map(|name| self.declare_ident(name, BindingKind::Var));
        let clauses = unfielded_named_children(node)
            .into_iter()
            .map(|c| self.lower_case(c))
            .collect();
        self.scopes.pop();
        SwitchStmt {
            init,
            alias,
            tag,
            clauses,
        }
    }

    fn lower_case(&mut self, clause: Node<'_>) -> CaseClause {
        self.scopes.push();
        let mut values = Vec::new();
        for value in field_children(clause, "value") {
            values.extend(self.lower_expr_list(value));
        }
        let comm = clause
            .child_by_field_name("communication")
            .map(|n| Box::new(self.lower_stmt(n)));
        let body = self.lower_block_in_scope(clause);
        self.scopes.pop();
        CaseClause { values, comm, body }
    }

    fn lower_receive(&mut self, node: Node<'_>) -> StmtKind {
        let rhs = self.lower_field(node, "right");
        let Some(left) = node.child_by_field_name("left") else {
            return StmtKind::Expr(rhs);
        };
        let define = has_token(node, ":=");
        let lhs = if define {
            expr_list_nodes(left)
                .into_iter()
                .map(|n| self.define_target(n))
                .collect()
        } else {
            self.lower_expr_list(left)
        };
        StmtKind::Assign(AssignStmt {
            lhs,
            op: if define {
                AssignOp::Define
            } else {
                AssignOp::Assign
            },
            rhs: vec![rhs],
        })
    }

    fn lower_var_specs(&mut self, node: Node<'_>, package_level: bool) -> Vec<VarSpec> {
        let kind = decl_kind(node);
        let mut specs = Vec::new();
        for spec in spec_nodes(node) {
            let mut values = Vec::new();
            for list in field_children(spec, "value") {
                values.extend(self.lower_expr_list(list));
            }
            let mut names = Vec::new();
            for name in field_children(spec, "name") {
                // Package-level names were declared by `predeclare`.
                let id = if package_level {
                    self.use_ident(name)
                } else {
                    self.declare_ident(name, kind)
                };
                names.push(id);
            }
            specs.push(VarSpec { names, values });
        }
        specs
    }

    // ── expressions ────────────────────────────────────────────

    fn lower_field(&mut self, node: Node<'_>, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_expr(child),
            None => Expr {
                kind: ExprKind::Other(Vec::new()),
                span: span_of(node),
            },
        }
    }

    fn lower_field_list(&mut self, node: Node<'_>, field: &str) -> Vec<Expr> {
        match node.child_by_field_name(field) {
            Some(list) => self.lower_expr_list(list),
            None => Vec::new(),
        }
    }

    fn lower_expr_list(&mut self, node: Node<'_>) -> Vec<Expr> {
        expr_list_nodes(node)
            .into_iter()
            .map(|n| self.lower_expr(n))
            .collect()
    }

    fn lower_expr(&mut self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        let kind = match node.kind() {
            "identifier" => ExprKind::Ident(self.use_ident(node)),
            "nil" => ExprKind::Ident(self.push_ident(NIL, None, span)),
            kind if LITERAL_KINDS.contains(&kind) || OPAQUE_KINDS.contains(&kind) => {
                ExprKind::Literal(self.text(node).to_string())
            }
            "literal_element" => {
                if let Some(inner) = named_children(node).first() {
                    return self.lower_expr(*inner);
                }
                ExprKind::Other(Vec::new())
            }
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => ExprKind::Paren(Box::new(self.lower_expr(*inner))),
                None => ExprKind::Other(Vec::new()),
            },
            "unary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|n| UnaryOp::from_token(self.text(n)));
                match (op, node.child_by_field_name("operand")) {
                    (Some(op), Some(operand)) => ExprKind::Unary {
                        op,
                        operand: Box::new(self.lower_expr(operand)),
                    },
                    _ => self.lower_other(node),
                }
            }
            "binary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|n| BinaryOp::from_token(self.text(n)));
                match (
                    op,
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    (Some(op), Some(lhs), Some(rhs)) => ExprKind::Binary {
                        op,
                        lhs: Box::new(self.lower_expr(lhs)),
                        rhs: Box::new(self.lower_expr(rhs)),
                    },
                    _ => self.lower_other(node),
                }
            }
            "call_expression" => {
                let func = self.lower_field(node, "function");
                let args = match node.child_by_field_name("arguments") {
                    Some(list) => named_children(list)
                        .into_iter()
                        .map(|a| self.lower_expr(a))
                        .collect(),
                    None => Vec::new(),
                };
                ExprKind::Call {
                    func: Box::new(func),
                    args,
                }
            }
            "selector_expression" => {
                let operand = self.lower_field(node, "operand");
                let field = node
                    .child_by_field_name("field")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                ExprKind::Selector {
                    operand: Box::new(operand),
                    field,
                }
            }
            "func_literal" => {
                self.scopes.push();
                self.declare_signature(node);
                let body = match node.child_by_field_name("body") {
                    Some(body) => self.lower_block_in_scope(body),
                    None => empty_block(span),
                };
                self.scopes.pop();
                ExprKind::FuncLit(Box::new(FuncLit { body }))
            }
            "keyed_element" => {
                let children = named_children(node);
                match (children.first(), children.get(1)) {
                    (Some(key), Some(value)) => ExprKind::KeyValue {
                        key: Box::new(self.lower_key(*key)),
                        value: Box::new(self.lower_expr(*value)),
                    },
                    _ => self.lower_other(node),
                }
            }
            _ => self.lower_other(node),
        };
        Expr { kind, span }
    }

    /// A bare identifier key of a composite literal may name a struct field,
    /// so it stays unresolved. Map keys such as `{err: 1}` are missed too.
    fn lower_key(&mut self, node: Node<'_>) -> Expr {
        let inner = if node.kind() == "literal_element" {
            named_children(node).first().copied().unwrap_or(node)
        } else {
            node
        };
        if inner.kind() == "identifier" {
            return Expr {
                kind: ExprKind::Literal(self.text(inner).to_string()),
                span: span_of(inner),
            };
        }
        self.lower_expr(inner)
    }

    fn lower_other(&mut self, node: Node<'_>) -> ExprKind {
        let children = named_children(node)
            .into_iter()
            .map(|c| self.lower_expr(c))
            .collect();
        ExprKind::Other(children)
    }
}

// ── CST helpers ────────────────────────────────────────────────

fn span_of(node: Node<'_>) -> Span {
    let pos = node.start_position();
    Span::new(
        node.start_byte() as u32,
        node.end_byte() as u32,
        pos.row as u32 + 1,
        pos.column as u32 + 1,
    )
}

fn empty_block(span: Span) -> Block {
    Block {
        stmts: Vec::new(),
        span,
    }
}

fn decl_kind(node: Node<'_>) -> BindingKind {
    if node.kind() == "const_declaration" {
        BindingKind::Const
    } else {
        BindingKind::Var
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Named children that are not attached to a field: statements of blocks and
/// clauses, clauses of switches, the header of a `for`.
fn unfielded_named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() && child.kind() != "comment" && cursor.field_name().is_none() {
                out.push(child);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

/// Statements of a block or clause; `statement_list` wrappers are flattened.
fn statement_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    for child in unfielded_named_children(node) {
        if child.kind() == "statement_list" {
            out.extend(statement_nodes(child));
        } else {
            out.push(child);
        }
    }
    out
}

fn expr_list_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == "expression_list" {
        named_children(node)
    } else {
        vec![node]
    }
}

/// `var_spec`/`const_spec` nodes of a declaration, looking through the
/// parenthesized list form.
fn spec_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    for child in named_children(node) {
        match child.kind() {
            "var_spec" | "const_spec" => out.push(child),
            "var_spec_list" | "const_spec_list" => out.extend(
                named_children(child)
                    .into_iter()
                    .filter(|c| matches!(c.kind(), "var_spec" | "const_spec")),
            ),
            _ => {}
        }
    }
    out
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}
