//! afternil diagnostics: diagnostic types, rule catalog, and output formatting.

pub mod diagnostic;
pub mod human;
pub mod plain;
pub mod rules;

pub use diagnostic::*;
