//! Export functionality for Rivulet charts.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! writing an assembled [`Chart`] out. It is the final stage in the pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Stage table
//!     ↓ structure
//! Registry + edges
//!     ↓ layout
//! Positions
//!     ↓ chart assembly
//! Chart
//!     ↓ export (this module)
//! Output file
//! ```
//!
//! # Available Backends
//!
//! - [`json`] - JSON chart description via [`json::JsonExporter`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering serialization failures and
//! I/O errors. [`Error`] converts into [`RivuletError::Export`] at the crate
//! boundary.
//!
//! [`RivuletError::Export`]: crate::RivuletError::Export

/// JSON export backend.
pub mod json;

use crate::chart::Chart;

/// Abstraction for chart export backends.
pub trait Exporter {
    /// Writes `chart` in the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the chart cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_chart(&mut self, chart: &Chart) -> Result<(), Error>;
}

/// Errors that can occur during chart export.
#[derive(Debug)]
pub enum Error {
    /// A serialization failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
