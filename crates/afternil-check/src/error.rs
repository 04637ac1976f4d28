//! Resolver contract violations.
//!
//! These are never analysis results: the caller aborts the whole run.

/// The binding information handed to the analyzer contradicts itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyFault {
    #[error("{path}:{line}:{column}: nil literal resolved to a binding")]
    NilLiteralBound {
        path: String,
        line: u32,
        column: u32,
    },
    #[error("{path}:{line}:{column}: `{name}` compared to nil has no binding")]
    GuardVariableUnbound {
        name: String,
        path: String,
        line: u32,
        column: u32,
    },
}
