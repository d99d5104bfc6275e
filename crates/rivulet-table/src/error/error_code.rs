//! Error codes for Rivulet diagnostics.
//!
//! Codes are grouped by the pipeline step that raises them:
//! - `E0xx` - Table loading
//! - `E1xx` - Data integrity (node registration)
//! - `E2xx` - Layout configuration

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed delimited text.
    ///
    /// The reader could not decode a record: broken quoting, invalid UTF-8,
    /// or an I/O failure underneath the reader.
    E001,

    /// Row wider than the header.
    ///
    /// A data row has more cells than the header row has stage names.
    E002,

    /// No stage columns.
    ///
    /// The input has no header cells (or no cells at all), so there is no
    /// stage to build a flow from.
    E003,

    /// Label shared across stages.
    ///
    /// The same cell text appears in two different stages and is merged into
    /// one node, which changes the diagram topology.
    E100,

    /// Unresolved layout override.
    ///
    /// A manual position override names a label or id that no node carries.
    E200,
}

impl ErrorCode {
    /// Returns the code as it appears in reports, e.g. `"E002"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E200 => "E200",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed delimited text",
            ErrorCode::E002 => "row wider than header",
            ErrorCode::E003 => "no stage columns",
            ErrorCode::E100 => "label shared across stages",
            ErrorCode::E200 => "unresolved layout override",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E002.to_string(), "E002");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E003.description(), "no stage columns");
        assert_eq!(ErrorCode::E200.description(), "unresolved layout override");
    }
}
