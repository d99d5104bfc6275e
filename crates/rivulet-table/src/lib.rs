//! # Rivulet Table
//!
//! Loads delimited text (a spreadsheet exported as CSV) into the tables the
//! Rivulet pipeline works on, and provides the diagnostic types every later
//! step reports problems with.
//!
//! ## Usage
//!
//! ```
//! # use rivulet_table::{load_stage_table, LoadOptions, error::DiagnosticError};
//!
//! fn main() -> Result<(), DiagnosticError> {
//!     let source = "system,feature,benefit\nNav,Maps,Comfort\nAudio,,\n";
//!
//!     let table = load_stage_table(source, &LoadOptions::default())?;
//!     assert_eq!(table.stage_count(), 3);
//!     assert_eq!(table.row_count(), 2);
//!     assert_eq!(table.cell(1, 1), None);
//!     Ok(())
//! }
//! ```

pub mod error;

mod reader;

pub use reader::LoadOptions;
pub use rivulet_core::span::Span;

use log::{debug, info};

use rivulet_core::table::{Stage, StageTable, TableError, TagTable};

use error::{Diagnostic, DiagnosticCollector, DiagnosticError, ErrorCode};
use reader::{Records, Row};

/// Load a stage table: one column per flow stage.
///
/// With headers, stage names come from the first record and empty names
/// become `Stage N`. Without headers the widest record decides the number of
/// stages. Records shorter than the stage count are padded with empty cells.
///
/// Diagnostic spans are byte offsets into `source`, which line up with
/// `String::from_utf8_lossy(source)` up to and including the first invalid
/// byte sequence.
///
/// # Errors
///
/// Returns a [`DiagnosticError`] holding:
/// - `E001` when a record is not UTF-8 or leaves a quote open,
/// - `E002` for every record wider than the header,
/// - `E003` when there is no stage column at all.
pub fn load_stage_table(
    source: impl AsRef<[u8]>,
    options: &LoadOptions,
) -> Result<StageTable, DiagnosticError> {
    let source = source.as_ref();
    info!(bytes = source.len(); "Loading stage table");

    let mut collector = DiagnosticCollector::new();
    let Records { header, rows } = reader::read_records(source, options, &mut collector);

    let names = match &header {
        Some(header) => stage_names(header.cells.len(), |index| header.cells[index].clone()),
        None => {
            let width = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
            stage_names(width, |_| None)
        }
    };

    if names.is_empty() && !collector.has_errors() {
        let diagnostic = Diagnostic::error("input has no stage columns")
            .with_code(ErrorCode::E003)
            .with_help("the first row must name at least one stage");
        let diagnostic = match &header {
            Some(header) => diagnostic.with_label(header.span, "empty header row"),
            None => diagnostic,
        };
        collector.emit(diagnostic);
    }

    for (index, row) in rows.iter().enumerate() {
        if !names.is_empty() && row.cells.len() > names.len() {
            collector.emit(too_wide(index, row, names.len(), header.as_ref()));
        }
    }

    collector.finish()?;

    let width = names.len();
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); width];
    let mut spans = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = row.cells.into_iter();
        for column in &mut columns {
            column.push(cells.next().flatten());
        }
        spans.push(row.span);
    }

    let stages = names
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Stage::new(name, cells))
        .collect();
    let table = StageTable::new(stages)
        .and_then(|table| table.with_row_spans(spans))
        .map_err(table_error)?;

    debug!(
        stages = table.stage_count(),
        rows = table.row_count();
        "Stage table loaded"
    );
    Ok(table)
}

/// Load a tag table of free-form text cells for the bubble overlay.
///
/// The header row, when enabled, is skipped; tag tables have no shape
/// constraints.
///
/// # Errors
///
/// Returns a [`DiagnosticError`] with `E001` when a record is not UTF-8 or
/// leaves a quote open.
pub fn load_tag_table(
    source: impl AsRef<[u8]>,
    options: &LoadOptions,
) -> Result<TagTable, DiagnosticError> {
    let source = source.as_ref();
    info!(bytes = source.len(); "Loading tag table");

    let mut collector = DiagnosticCollector::new();
    let Records { rows, .. } = reader::read_records(source, options, &mut collector);
    collector.finish()?;

    let tags = TagTable::new(rows.into_iter().map(|row| row.cells).collect());
    debug!(rows = tags.row_count(); "Tag table loaded");
    Ok(tags)
}

fn stage_names(width: usize, name_at: impl Fn(usize) -> Option<String>) -> Vec<String> {
    (0..width)
        .map(|index| name_at(index).unwrap_or_else(|| format!("Stage {}", index + 1)))
        .collect()
}

fn too_wide(index: usize, row: &Row, width: usize, header: Option<&Row>) -> Diagnostic {
    let diagnostic = Diagnostic::error(format!(
        "data row {} has {} cells but only {} stages are named",
        index + 1,
        row.cells.len(),
        width
    ))
    .with_code(ErrorCode::E002)
    .with_label(row.span, "too many cells");
    let diagnostic = match header {
        Some(header) => diagnostic.with_secondary_label(header.span, "stages are named here"),
        None => diagnostic,
    };
    diagnostic.with_help("add a stage name for the extra column or remove the extra cells")
}

fn table_error(err: TableError) -> DiagnosticError {
    let code = match err {
        TableError::NoStages => ErrorCode::E003,
        TableError::RowTooWide { .. }
        | TableError::RaggedStage { .. }
        | TableError::SpanCountMismatch { .. } => ErrorCode::E002,
    };
    Diagnostic::error(err.to_string()).with_code(code).into()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn grid_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        (2usize..5).prop_flat_map(|width| {
            prop::collection::vec(prop::collection::vec("[a-z]{0,3}", width), 0..20)
        })
    }

    /// Every cell written out must load back into the same stage and row.
    fn check_cells_survive_loading(grid: Vec<Vec<String>>) -> Result<(), TestCaseError> {
        let width = grid.first().map_or(2, Vec::len);
        let header: Vec<String> = (0..width).map(|index| format!("S{index}")).collect();
        let mut source = header.join(",");
        source.push('\n');
        for row in &grid {
            source.push_str(&row.join(","));
            source.push('\n');
        }

        let table = load_stage_table(&source, &LoadOptions::default())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(table.stage_count(), width);
        prop_assert_eq!(table.row_count(), grid.len());
        for (row, cells) in grid.iter().enumerate() {
            for (stage, cell) in cells.iter().enumerate() {
                let expected = if cell.is_empty() { None } else { Some(cell.as_str()) };
                prop_assert_eq!(table.cell(stage, row), expected);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn cells_survive_loading(grid in grid_strategy()) {
            check_cells_survive_loading(grid)?;
        }
    }
}
