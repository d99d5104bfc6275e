//! Error adapter for converting RivuletError to miette diagnostics.
//!
//! This module bridges the library's error and diagnostic types and
//! miette's graphical reports used by the CLI.
//!
//! # Multi-Error Support
//!
//! Loaders collect every problem they find, so one [`RivuletError`] may hold
//! several diagnostics. Each is rendered as its own report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan};

use rivulet::RivuletError;
use rivulet_table::{
    Span,
    error::{Diagnostic, Severity},
};

/// Adapter for a single rivulet diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Text the diagnostic's spans point into.
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|code| Box::new(code) as Box<dyn fmt::Display + 'a>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`RivuletError`] variants without diagnostics.
///
/// Adds a code naming the failed step and, where one helps, a hint at the
/// setting to change.
pub struct ErrorAdapter<'a>(pub &'a RivuletError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            RivuletError::Io(_) => "rivulet::io",
            RivuletError::Load { .. } => "rivulet::load",
            RivuletError::Integrity(_) => "rivulet::integrity",
            RivuletError::Config(_) => "rivulet::config",
            RivuletError::Layout(_) => "rivulet::layout",
            RivuletError::Export(_) => "rivulet::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            RivuletError::Io(_) => "check the input, tags and output paths",
            RivuletError::Config(_) => "fix the configuration file or pass another with --config",
            RivuletError::Integrity(_) => {
                "set `collisions = \"separate\"` under [registry] to keep one node per stage"
            }
            RivuletError::Load { .. } | RivuletError::Layout(_) | RivuletError::Export(_) => {
                return None;
            }
        };
        Some(Box::new(help))
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`RivuletError`] into the reports to print.
///
/// [`RivuletError::Load`] yields one report per diagnostic, rendered against
/// its source; every other variant yields a single one. An `Integrity` error
/// carries no source text, so attach it with [`RivuletError::with_source`]
/// first to get snippets.
pub fn to_reportables(err: &RivuletError) -> Vec<Box<dyn MietteDiagnostic + '_>> {
    match err {
        RivuletError::Load { err: load_err, src } => load_err
            .diagnostics()
            .iter()
            .map(|d| Box::new(DiagnosticAdapter::new(d, src)) as Box<dyn MietteDiagnostic + '_>)
            .collect(),
        _ => vec![Box::new(ErrorAdapter(err)) as Box<dyn MietteDiagnostic + '_>],
    }
}

/// Render one report with miette's graphical handler.
///
/// Falls back to the plain message if the handler fails.
pub fn render(report: &dyn MietteDiagnostic) -> String {
    let mut writer = String::new();
    match GraphicalReportHandler::new().render_report(&mut writer, report) {
        Ok(()) => writer,
        Err(_) => report.to_string(),
    }
}

/// Render non-fatal diagnostics against `src`, one report per warning.
pub fn render_warnings(warnings: &[Diagnostic], src: &str) -> Vec<String> {
    warnings
        .iter()
        .map(|warning| render(&DiagnosticAdapter::new(warning, src)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rivulet_table::error::{DiagnosticError, ErrorCode};

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("test error")
            .with_code(ErrorCode::E002)
            .with_label(Span::new(0..5), "here")
            .with_help("try this");
        let err = RivuletError::new_load_error(DiagnosticError::from(diag), "hello");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "test error");
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()),
            Some("E002".to_string())
        );
        assert!(reportables[0].source_code().is_some());
    }

    #[test]
    fn test_every_load_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("first error")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(0..5), "first"),
            Diagnostic::error("second error")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(6..11), "second"),
        ];
        let err = RivuletError::new_load_error(DiagnosticError::from(diags), "a,b,c\nd,e,f\n");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
    }

    #[test]
    fn test_plain_error() {
        let err = RivuletError::Layout("layout error".to_string());

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "Layout error: layout error");
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()),
            Some("rivulet::layout".to_string())
        );
        assert!(reportables[0].help().is_none());
    }

    #[test]
    fn test_config_error_points_at_the_flag() {
        let err = RivuletError::Config("palette_size must be positive".to_string());

        let rendered = render(&ErrorAdapter(&err));
        assert!(rendered.contains("rivulet::config"));
        assert!(rendered.contains("--config"));
    }

    #[test]
    fn test_unsourced_integrity_error_suggests_separate() {
        let err = RivuletError::Integrity(
            Diagnostic::error("label `a` appears in stage `S0` and stage `S1`")
                .with_code(ErrorCode::E100)
                .into(),
        );

        let reportables = to_reportables(&err);
        let help = reportables[0].help().map(|help| help.to_string());
        assert!(help.is_some_and(|help| help.contains("separate")));
    }

    #[test]
    fn test_labels_keep_primary_flag() {
        let diag = Diagnostic::warning("label reused")
            .with_label(Span::new(6..9), "reused here")
            .with_secondary_label(Span::new(0..5), "first seen here");

        let adapter = DiagnosticAdapter::new(&diag, "S0,S1\na,a\n");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("reused here"));
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(adapter.severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_render_warnings_mentions_message() {
        let diag = Diagnostic::warning("label `a` appears twice")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(6..9), "reused here");

        let rendered = render_warnings(&[diag], "S0,S1\na,a\n");
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("label `a` appears twice"));
    }
}
