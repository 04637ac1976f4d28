//! afternil check - reference-after-nil-check detection
//!
//! Finds reads of a variable past a guard `if v != nil { ...; return }`,
//! where the variable is always nil.

pub mod error;
pub mod fix;
pub mod guard;
pub mod remainder;
pub mod rules;
pub mod scanner;
pub mod taint;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ConsistencyFault;
pub use fix::apply_fix;
pub use scanner::{analyze, Failure};

use afternil_ast::SourceFile;
use afternil_diagnostics::diagnostic::Diagnostic;

/// Diagnostic-producing front door used by the host.
pub struct RefAnalyzer;

impl RefAnalyzer {
    /// Analyze a file and convert every failure into a REF001 diagnostic.
    pub fn analyze(file: &SourceFile) -> Result<Vec<Diagnostic>, ConsistencyFault> {
        let failures = analyze(file)?;
        Ok(Self::diagnostics(file, &failures))
    }

    pub fn diagnostics(file: &SourceFile, failures: &[Failure]) -> Vec<Diagnostic> {
        failures
            .iter()
            .map(|failure| rules::build_ref001(failure, file))
            .collect()
    }
}
