//! Variable identity and lexical scopes.
//!
//! Every declared name gets one [`Binding`] in the file's arena. Two
//! identifier occurrences denote the same variable iff they carry the same
//! [`BindingId`]; names are never compared.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::Span;

/// Handle of a [`Binding`] in [`crate::SourceFile::bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingId(pub u32);

impl BindingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// `var`, `:=`, range and select-receive variables.
    Var,
    Const,
    /// Receiver, parameter or named result.
    Param,
    Func,
    /// Name used in the file without a declaration in it (declared in another
    /// file of the package, an import, or a predeclared identifier other than
    /// `nil`).
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Declaring occurrence; `None` for external bindings.
    pub decl: Option<Span>,
}

/// Scope stack used while lowering a file.
///
/// The bottom scope is the file scope. It also holds the external bindings,
/// created on first use, so every free name maps to one binding per file.
#[derive(Debug)]
pub(crate) struct Scopes {
    bindings: Vec<Binding>,
    stack: Vec<HashMap<String, BindingId>>,
}

impl Scopes {
    pub(crate) fn new() -> Self {
        Self {
            bindings: Vec::new(),
            stack: vec![HashMap::new()],
        }
    }

    pub(crate) fn push(&mut self) {
        self.stack.push(HashMap::new());
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "file scope must not be popped");
        self.stack.pop();
    }

    /// Declare `name` in the innermost scope, shadowing outer declarations.
    pub(crate) fn declare(&mut self, name: &str, kind: BindingKind, decl: Span) -> BindingId {
        let id = self.alloc(name, kind, Some(decl));
        if let Some(scope) = self.stack.last_mut() {
            scope.insert(name.to_string(), id);
        }
        id
    }

    /// Declare a package-level name. A free use seen earlier in the file
    /// already created the file-scope binding, which is then reused.
    pub(crate) fn declare_package(&mut self, name: &str, kind: BindingKind, decl: Span) -> BindingId {
        if let Some(&id) = self.stack[0].get(name) {
            let binding = &mut self.bindings[id.index()];
            if binding.kind == BindingKind::External {
                binding.kind = kind;
                binding.decl = Some(decl);
            }
            return id;
        }
        let id = self.alloc(name, kind, Some(decl));
        self.stack[0].insert(name.to_string(), id);
        id
    }

    /// Binding declared for `name` in the innermost scope only.
    pub(crate) fn lookup_current(&self, name: &str) -> Option<BindingId> {
        self.stack.last().and_then(|scope| scope.get(name).copied())
    }

    /// Resolve a use of `name`, innermost scope first. Free names get a
    /// file-scope external binding.
    pub(crate) fn resolve(&mut self, name: &str) -> BindingId {
        if let Some(id) = self.stack.iter().rev().find_map(|scope| scope.get(name).copied()) {
            return id;
        }
        let id = self.alloc(name, BindingKind::External, None);
        self.stack[0].insert(name.to_string(), id);
        id
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    fn alloc(&mut self, name: &str, kind: BindingKind, decl: Option<Span>) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding {
            name: name.to_string(),
            kind,
            decl,
        });
        id
    }
}
