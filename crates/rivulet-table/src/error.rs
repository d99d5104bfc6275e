//! Diagnostics for table loading and data-integrity checks.
//!
//! Problems found in the input tables are described by [`Diagnostic`]s: a
//! severity, an optional [`ErrorCode`], a message, labelled byte spans into
//! the source text, and optional help. Fatal diagnostics travel together in a
//! [`DiagnosticError`]; a [`DiagnosticCollector`] gathers them so that every
//! malformed row is reported at once instead of only the first.
//!
//! # Example
//!
//! ```
//! # use rivulet_table::error::{Diagnostic, ErrorCode};
//! # use rivulet_table::Span;
//!
//! let diag = Diagnostic::warning("label `Cloud` appears in stages `system` and `benefit`")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(40..52), "reused here")
//!     .with_secondary_label(Span::new(10..22), "first seen here")
//!     .with_help("rename one of the cells if the stages should stay apart");
//!
//! assert!(diag.severity().is_warning());
//! assert_eq!(diag.labels().len(), 2);
//! ```

mod diagnostic;
mod diagnostic_error;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use diagnostic_error::{DiagnosticCollector, DiagnosticError};
pub use error_code::ErrorCode;
