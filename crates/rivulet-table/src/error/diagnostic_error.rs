//! Fatal diagnostic bundles and the collector that produces them.

use std::fmt;

use super::Diagnostic;

/// One or more diagnostics that stopped a pipeline step.
///
/// [`DiagnosticCollector::finish`] only produces one after an error-severity
/// diagnostic was emitted, and warnings from the same step ride along so the
/// report is complete. The constructors take the list as given, so an error
/// built by hand may hold warnings only, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticError {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticError {
    /// Create an error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticError {}

impl From<Diagnostic> for DiagnosticError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for DiagnosticError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Accumulates diagnostics over one pipeline step.
///
/// ```
/// # use rivulet_table::error::{Diagnostic, DiagnosticCollector, ErrorCode};
/// let mut collector = DiagnosticCollector::new();
/// collector.emit(Diagnostic::warning("shared label").with_code(ErrorCode::E100));
///
/// // Only warnings: the step succeeds and hands the warnings back.
/// let warnings = collector.finish().unwrap();
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` once any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish the step.
    ///
    /// Returns the warnings when no error was emitted, otherwise a
    /// [`DiagnosticError`] carrying everything that was collected.
    pub fn finish(self) -> Result<Vec<Diagnostic>, DiagnosticError> {
        if self.has_errors {
            Err(DiagnosticError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
