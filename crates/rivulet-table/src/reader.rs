//! Record reading on top of the `csv` crate.
//!
//! Headers are handled here rather than by the `csv` reader so that the
//! header row and data rows get their spans computed the same way.

use csv::{ByteRecord, ReaderBuilder, Trim};
use log::{debug, trace};

use rivulet_core::span::Span;

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode};

/// Options controlling how delimited text is read.
///
/// # Examples
///
/// ```
/// use rivulet_table::LoadOptions;
///
/// let options = LoadOptions::default()
///     .with_delimiter(b';')
///     .with_headers(false)
///     .with_trim(false);
/// assert_eq!(options.delimiter(), b';');
/// assert!(!options.has_headers());
/// assert!(!options.trim());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    delimiter: u8,
    has_headers: bool,
    trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            trim: true,
        }
    }
}

impl LoadOptions {
    /// Sets the field delimiter byte.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether the first record names the columns.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Sets whether surrounding whitespace is stripped from every field.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Returns the field delimiter byte.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Returns whether the first record names the columns.
    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    /// Returns whether fields are trimmed.
    pub fn trim(&self) -> bool {
        self.trim
    }
}

/// One decoded record with the span it occupies in the source.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub(crate) cells: Vec<Option<String>>,
    pub(crate) span: Span,
}

/// Records split into the optional header and the data rows.
#[derive(Debug, Default)]
pub(crate) struct Records {
    pub(crate) header: Option<Row>,
    pub(crate) rows: Vec<Row>,
}

/// Reads every record of `source`.
///
/// A record that is not UTF-8 or whose quotes do not balance stops the read
/// and is emitted as `E001`; the records read before it are still returned
/// so callers can keep reporting.
pub(crate) fn read_records(
    source: &[u8],
    options: &LoadOptions,
    collector: &mut DiagnosticCollector,
) -> Records {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(if options.trim { Trim::All } else { Trim::None })
        .from_reader(source);

    let mut records = Records::default();
    let mut record = ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {
                let end = (reader.position().byte() as usize).min(source.len());
                let start = record
                    .position()
                    .map_or(0, |position| position.byte() as usize)
                    .min(end);
                let line = record.position().map_or(0, |position| position.line());

                if let Some(diagnostic) = malformed(source, start, end, line) {
                    collector.emit(diagnostic);
                    break;
                }

                let row = Row {
                    cells: record
                        .iter()
                        .map(|field| cell_value(&String::from_utf8_lossy(field)))
                        .collect(),
                    span: record_span(source, start, end),
                };
                trace!(start = row.span.start(), end = row.span.end(); "Read record");

                if options.has_headers && records.header.is_none() {
                    records.header = Some(row);
                } else {
                    records.rows.push(row);
                }
            }
            Ok(false) => break,
            Err(err) => {
                let at = err
                    .position()
                    .map_or(source.len(), |position| position.byte() as usize)
                    .min(source.len());
                let line = err.position().map_or(0, |position| position.line());
                collector.emit(
                    Diagnostic::error(format!("could not read record near line {line}: {err}"))
                        .with_code(ErrorCode::E001)
                        .with_label(
                            record_span(source, at, source.len().min(at + 1)),
                            "unreadable record",
                        )
                        .with_help("check quoting and make sure the file is UTF-8 encoded"),
                );
                break;
            }
        }
    }

    debug!(
        has_header = records.header.is_some(),
        rows = records.rows.len();
        "Records read"
    );
    records
}

/// Checks the raw bytes of one record for invalid UTF-8 and unbalanced quotes.
///
/// The UTF-8 label starts at the first invalid byte and is as long as the
/// replacement character, so it lines up with the lossily decoded source.
fn malformed(source: &[u8], start: usize, end: usize, line: u64) -> Option<Diagnostic> {
    let raw = &source[start..end];

    if let Err(err) = std::str::from_utf8(raw) {
        let at = start + err.valid_up_to();
        return Some(
            Diagnostic::error(format!("record on line {line} is not valid UTF-8"))
                .with_code(ErrorCode::E001)
                .with_label(
                    Span::new(at..at + char::REPLACEMENT_CHARACTER.len_utf8()),
                    "invalid byte sequence",
                )
                .with_help("re-export the table as UTF-8"),
        );
    }

    // Escaped quotes come in pairs, so an odd count means a quote never closed.
    let quotes = raw.iter().filter(|&&byte| byte == b'"').count();
    if quotes % 2 == 1 {
        return Some(
            Diagnostic::error(format!("record on line {line} has unbalanced quotes"))
                .with_code(ErrorCode::E001)
                .with_label(record_span(source, start, end), "quote is never closed")
                .with_help("close the quoted field or double quotes inside it"),
        );
    }

    None
}

fn cell_value(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// Span of `start..end` with line terminators stripped from both ends.
fn record_span(bytes: &[u8], start: usize, end: usize) -> Span {
    let end = end.min(bytes.len());
    let start = start.min(end);
    let is_content = |byte: &u8| !matches!(byte, b'\r' | b'\n');
    let Some(first) = bytes[start..end].iter().position(is_content) else {
        return Span::new(start..start);
    };
    let last = bytes[start..end].iter().rposition(is_content).unwrap_or(first);
    Span::new(start + first..start + last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str, options: LoadOptions) -> (Records, DiagnosticCollector) {
        let mut collector = DiagnosticCollector::new();
        let records = read_records(source.as_bytes(), &options, &mut collector);
        (records, collector)
    }

    #[test]
    fn test_header_is_split_from_rows() {
        let (records, collector) = read("s0,s1\na,x\nb,y\n", LoadOptions::default());
        assert!(!collector.has_errors());

        let header = records.header.expect("header row");
        assert_eq!(header.cells, vec![Some("s0".to_string()), Some("s1".to_string())]);
        assert_eq!(records.rows.len(), 2);
        assert_eq!(records.rows[1].cells, vec![Some("b".to_string()), Some("y".to_string())]);
    }

    #[test]
    fn test_spans_cover_records_without_terminator() {
        let source = "s0,s1\r\na,x\r\nbb,yy";
        let (records, _) = read(source, LoadOptions::default());

        let header = records.header.unwrap();
        assert_eq!(&source[header.span.start()..header.span.end()], "s0,s1");
        assert_eq!(
            &source[records.rows[0].span.start()..records.rows[0].span.end()],
            "a,x"
        );
        assert_eq!(
            &source[records.rows[1].span.start()..records.rows[1].span.end()],
            "bb,yy"
        );
    }

    #[test]
    fn test_trim_and_empty_cells() {
        let (records, _) = read("s0,s1\n  a , \n", LoadOptions::default());
        assert_eq!(records.rows[0].cells, vec![Some("a".to_string()), None]);

        let (records, _) = read("s0,s1\n  a ,\n", LoadOptions::default().with_trim(false));
        assert_eq!(records.rows[0].cells, vec![Some("  a ".to_string()), None]);
    }

    #[test]
    fn test_without_headers_every_record_is_a_row() {
        let (records, _) = read("a,x\nb,y\n", LoadOptions::default().with_headers(false));
        assert!(records.header.is_none());
        assert_eq!(records.rows.len(), 2);
    }

    #[test]
    fn test_custom_delimiter() {
        let (records, _) = read("s0;s1\na;x\n", LoadOptions::default().with_delimiter(b';'));
        assert_eq!(records.rows[0].cells, vec![Some("a".to_string()), Some("x".to_string())]);
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let (records, collector) = read("s0,s1\n\"a, b\",x\n\"say \"\"hi\"\"\",y\n", LoadOptions::default());
        assert!(!collector.has_errors());
        assert_eq!(records.rows[0].cells[0].as_deref(), Some("a, b"));
        assert_eq!(records.rows[1].cells[0].as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn test_unbalanced_quotes_are_malformed() {
        for source in ["s0,s1\na,\"unterminated\n", "s0\n\"a\"b\"\n", "s0,s1\n\"\"\"\n"] {
            let (records, collector) = read(source, LoadOptions::default());
            assert!(records.rows.is_empty(), "{source:?}");

            let err = collector.finish().unwrap_err();
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001), "{source:?}");
        }
    }

    #[test]
    fn test_invalid_utf8_points_at_first_bad_byte() {
        let source = b"s0,s1\na,x\nb,\xff\xfe\nc,z\n";
        let mut collector = DiagnosticCollector::new();
        let records = read_records(source, &LoadOptions::default(), &mut collector);
        assert_eq!(records.rows.len(), 1);

        let err = collector.finish().unwrap_err();
        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E001));
        assert!(diagnostic.message().contains("line 3"));

        let span = diagnostic.labels()[0].span();
        let text = String::from_utf8_lossy(source);
        assert_eq!(&text[span.start()..span.end()], "\u{FFFD}");
    }
}
