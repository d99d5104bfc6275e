//! Tabular inputs of the pipeline.
//!
//! - [`StageTable`] - Named stage columns of equal length; the flow source
//! - [`Stage`] - One column of a [`StageTable`]
//! - [`TagTable`] - Free-form text cells feeding the bubble overlay
//!
//! Empty cells are stored as `None` and mean "no flow through this row at
//! this stage". They are never turned into nodes.

use thiserror::Error;

use crate::span::Span;

/// Errors raised when a table violates its shape invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("a stage table needs at least one stage column")]
    NoStages,

    #[error("stage `{stage}` has {found} rows, expected {expected}")]
    RaggedStage {
        stage: String,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} cells but the table has only {expected} stages")]
    RowTooWide {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{found} row spans supplied for a table of {expected} rows")]
    SpanCountMismatch { expected: usize, found: usize },
}

/// One named column of a [`StageTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    cells: Vec<Option<String>>,
}

impl Stage {
    /// Creates a stage column. Cells that are `Some("")` are normalized to `None`.
    pub fn new(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        let cells = cells
            .into_iter()
            .map(|cell| cell.filter(|value| !value.is_empty()))
            .collect();
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Returns the stage name (the column header).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all cells, top to bottom.
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Returns the value at `row`, or `None` when the cell is empty or out of range.
    pub fn cell(&self, row: usize) -> Option<&str> {
        self.cells.get(row).and_then(|cell| cell.as_deref())
    }

    /// Iterates over `(row, value)` for every non-empty cell, top to bottom.
    pub fn present(&self) -> impl Iterator<Item = (usize, &str)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(row, cell)| cell.as_deref().map(|value| (row, value)))
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

/// An ordered sequence of equally long stage columns.
///
/// # Examples
///
/// ```
/// use rivulet_core::table::StageTable;
///
/// let table = StageTable::from_rows(
///     ["system", "feature"],
///     [vec!["a", "x"], vec!["b", ""], vec!["a", "y"]],
/// )
/// .unwrap();
///
/// assert_eq!(table.stage_count(), 2);
/// assert_eq!(table.row_count(), 3);
/// assert_eq!(table.cell(1, 1), None);
/// assert_eq!(table.cell(1, 2), Some("y"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    stages: Vec<Stage>,
    row_spans: Vec<Span>,
}

impl StageTable {
    /// Creates a table from stage columns.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoStages`] for an empty column list and
    /// [`TableError::RaggedStage`] when the columns differ in length.
    pub fn new(stages: Vec<Stage>) -> Result<Self, TableError> {
        let Some(first) = stages.first() else {
            return Err(TableError::NoStages);
        };
        let expected = first.len();
        if let Some(ragged) = stages.iter().find(|stage| stage.len() != expected) {
            return Err(TableError::RaggedStage {
                stage: ragged.name().to_string(),
                expected,
                found: ragged.len(),
            });
        }
        Ok(Self {
            stages,
            row_spans: Vec::new(),
        })
    }

    /// Builds a table from stage names and row-major cell values.
    ///
    /// Empty strings denote empty cells; rows shorter than the stage count are
    /// padded with empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoStages`] when `names` is empty and
    /// [`TableError::RowTooWide`] when a row has more cells than there are stages.
    pub fn from_rows<N, R, C>(names: N, rows: R) -> Result<Self, TableError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(TableError::NoStages);
        }

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for (row, cells) in rows.into_iter().enumerate() {
            let cells: Vec<Option<String>> = cells
                .into_iter()
                .map(|cell| Some(cell.as_ref().to_string()))
                .collect();
            if cells.len() > names.len() {
                return Err(TableError::RowTooWide {
                    row,
                    expected: names.len(),
                    found: cells.len(),
                });
            }
            let mut cells = cells.into_iter();
            for column in &mut columns {
                column.push(cells.next().flatten());
            }
        }

        let stages = names
            .into_iter()
            .zip(columns)
            .map(|(name, cells)| Stage::new(name, cells))
            .collect();
        Self::new(stages)
    }

    /// Attaches one source span per data row, used to point diagnostics at rows.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::SpanCountMismatch`] when the span count differs
    /// from the row count.
    pub fn with_row_spans(mut self, row_spans: Vec<Span>) -> Result<Self, TableError> {
        if row_spans.len() != self.row_count() {
            return Err(TableError::SpanCountMismatch {
                expected: self.row_count(),
                found: row_spans.len(),
            });
        }
        self.row_spans = row_spans;
        Ok(self)
    }

    /// Returns all stages in declared order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the stage at `index`, if any.
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Returns the stage names in declared order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(Stage::name)
    }

    /// Returns the number of stages. Always at least one.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the index of the terminal (last) stage.
    pub fn terminal_stage(&self) -> usize {
        self.stages.len() - 1
    }

    /// Returns the number of rows shared by every stage.
    pub fn row_count(&self) -> usize {
        self.stages.first().map_or(0, Stage::len)
    }

    /// Returns the value at (`stage`, `row`), or `None` for empty or out-of-range cells.
    pub fn cell(&self, stage: usize, row: usize) -> Option<&str> {
        self.stages.get(stage).and_then(|column| column.cell(row))
    }

    /// Returns the source span of `row`, when the table was loaded from text.
    pub fn row_span(&self, row: usize) -> Option<Span> {
        self.row_spans.get(row).copied()
    }
}

/// Free-form text cells, rows by columns, feeding the bubble overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    rows: Vec<Vec<Option<String>>>,
}

impl TagTable {
    /// Creates a tag table. Cells that are `Some("")` are normalized to `None`.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.filter(|value| !value.is_empty()))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over every non-empty cell, row-major.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().filter_map(|cell| cell.as_deref()))
    }
}
