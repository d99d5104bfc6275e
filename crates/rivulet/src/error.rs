//! Error types for Rivulet operations.
//!
//! This module provides the main error type [`RivuletError`] which wraps
//! the error conditions that can occur while building a chart.

use std::io;

use thiserror::Error;

use rivulet_table::error::DiagnosticError;

/// The main error type for Rivulet operations.
///
/// # Diagnostic Variants
///
/// `Load` and `Integrity` carry structured diagnostics with source spans.
/// `Load` also holds the text the spans point into; `Integrity` spans point
/// into the stage table source the chart was built from.
#[derive(Debug, Error)]
pub enum RivuletError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Load { err: DiagnosticError, src: String },

    #[error("{0}")]
    Integrity(DiagnosticError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for RivuletError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl RivuletError {
    /// Create a new `Load` error with the associated source text.
    pub fn new_load_error(err: DiagnosticError, src: impl Into<String>) -> Self {
        Self::Load {
            err,
            src: src.into(),
        }
    }

    /// Attach the stage table source to an `Integrity` error.
    ///
    /// The result is a `Load` error whose spans can be rendered against
    /// `src`. Every other variant is returned unchanged.
    pub fn with_source(self, src: impl Into<String>) -> Self {
        match self {
            Self::Integrity(err) => Self::new_load_error(err, src),
            other => other,
        }
    }
}
