//! Printing a (possibly rewritten) file back to source text.

use crate::ast::{Ident, SourceFile};

impl SourceFile {
    /// Identifier occurrences whose display text no longer matches the
    /// source, in source order.
    pub fn rewritten_idents(&self) -> Vec<&Ident> {
        let mut edits: Vec<&Ident> = self
            .idents
            .iter()
            .filter(|ident| {
                let range = ident.span.start as usize..ident.span.end as usize;
                self.source.get(range) != Some(ident.name.as_str())
            })
            .collect();
        edits.sort_by_key(|ident| ident.span.start);
        edits.dedup_by_key(|ident| ident.span.start);
        edits
    }

    /// Source text with every rewritten identifier substituted. All other
    /// bytes, comments and formatting included, are preserved.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0usize;
        for ident in self.rewritten_idents() {
            let start = ident.span.start as usize;
            let end = ident.span.end as usize;
            if start < cursor || end > self.source.len() {
                continue;
            }
            out.push_str(&self.source[cursor..start]);
            out.push_str(&ident.name);
            cursor = end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}
