//! Analysis tree for a single Go source file.
//!
//! The tree is lowered from the tree-sitter CST by [`crate::lower`]. Nodes are
//! owned and immutable during analysis; identifiers live in a per-file arena
//! ([`SourceFile::idents`]) so that analysis results can name an occurrence by
//! handle and the fixer can rewrite it afterwards.

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, BindingId};

/// Byte range plus the 1-based position of its first byte.
///
/// Columns are byte offsets (matching Go's `token.Position.Column`), so a tab
/// counts as one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span used for synthesized nodes that have no source text.
    pub fn dummy() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// Handle of an identifier occurrence in [`SourceFile::idents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentId(pub u32);

impl IdentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// Display text. Starts as the source text and changes only when a fix
    /// rewrites the occurrence.
    pub name: String,
    /// Resolved variable, `None` for the predeclared `nil` and for rewritten
    /// occurrences.
    pub binding: Option<BindingId>,
    pub span: Span,
}

impl Ident {
    pub fn is_nil_literal(&self) -> bool {
        self.name == NIL
    }
}

/// Text of Go's predeclared nil identifier.
pub const NIL: &str = "nil";

/// A parsed, resolved Go file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub source: String,
    pub decls: Vec<Decl>,
    pub idents: Vec<Ident>,
    pub bindings: Vec<Binding>,
}

impl SourceFile {
    pub fn ident(&self, id: IdentId) -> &Ident {
        &self.idents[id.index()]
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    /// Whether the identifier occurrence resolves to `binding`.
    pub fn refers_to(&self, id: IdentId, binding: BindingId) -> bool {
        self.ident(id).binding == Some(binding)
    }

    /// Replace the display text of an occurrence and drop its binding.
    pub fn rewrite_ident(&mut self, id: IdentId, text: &str) {
        let ident = &mut self.idents[id.index()];
        ident.name = text.to_string();
        ident.binding = None;
    }

    /// Text of the 1-based `line`, without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        self.source.lines().nth(line as usize - 1)
    }
}

/// Top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    /// Package-level `var` or `const` declaration.
    Var(Stmt),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// `None` for declarations without a body (assembly stubs).
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Block),
    If(Box<IfStmt>),
    Return(Vec<Expr>),
    Assign(AssignStmt),
    IncDec { target: Expr, increment: bool },
    Expr(Expr),
    Send { channel: Expr, value: Expr },
    /// `var` or `const` specs inside a function.
    VarDecl(Vec<VarSpec>),
    Go(Expr),
    Defer(Expr),
    For(Box<ForStmt>),
    Range(Box<RangeStmt>),
    Switch(Box<SwitchStmt>),
    Select(Vec<CaseClause>),
    Labeled { label: String, stmt: Box<Stmt> },
    /// `break`, `continue`, `goto` or `fallthrough`.
    Branch(String),
    Empty,
    /// Statement the lowering does not model; its expressions are kept so
    /// traversals still see their identifiers.
    Opaque(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub body: Block,
    pub else_clause: Option<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`, `<<=` and friends.
    Compound,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: AssignOp,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct VarSpec {
    pub names: Vec<IdentId>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub post: Option<Stmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    pub define: bool,
    pub expr: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub init: Option<Stmt>,
    /// Type switch alias (`switch v := x.(type)`).
    pub alias: Option<IdentId>,
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
}

/// `case`/`default` clause of a switch or select.
#[derive(Debug, Clone)]
pub struct CaseClause {
    pub values: Vec<Expr>,
    /// Send or receive of a select clause.
    pub comm: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(IdentId),
    Literal(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Selector {
        operand: Box<Expr>,
        field: String,
    },
    Paren(Box<Expr>),
    FuncLit(Box<FuncLit>),
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    /// Index, slice, type assertion, composite literal and other forms whose
    /// structure does not matter beyond the expressions they contain.
    Other(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `&`
    Addr,
    /// `*`
    Deref,
    Neg,
    Plus,
    Not,
    Xor,
    /// `<-`
    Recv,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "&" => Self::Addr,
            "*" => Self::Deref,
            "-" => Self::Neg,
            "+" => Self::Plus,
            "!" => Self::Not,
            "^" => Self::Xor,
            "<-" => Self::Recv,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LogAnd,
    LogOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "&" => Self::And,
            "|" => Self::Or,
            "^" => Self::Xor,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "&^" => Self::AndNot,
            "&&" => Self::LogAnd,
            "||" => Self::LogOr,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => return None,
        })
    }
}
