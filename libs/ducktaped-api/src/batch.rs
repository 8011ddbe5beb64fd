use crate::error::PluginError;
use crate::value::Cell;

/// Read-only view of a set of equal-length parallel columns.
///
/// This is the seam between a host's column format and a function: the host
/// implements it over its own vectors (Arrow, native chunks, ...) and the
/// function only ever reads typed cells through it. A batch may have zero
/// columns and still carry rows.
pub trait RowBatch {
    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    /// Cell at `(column, row)`. Out-of-range positions are a caller bug and
    /// may panic.
    fn cell(&self, column: usize, row: usize) -> Cell<'_>;
}

/// Result column of a scalar function call. One `push_str` per input row.
pub trait OutputColumn {
    fn push_str(&mut self, value: &str);
}

impl OutputColumn for Vec<String> {
    fn push_str(&mut self, value: &str) {
        self.push(value.to_owned());
    }
}

/// Column-major in-memory batch of owned cells.
///
/// Used by hosts without a native column format and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBatch {
    rows: usize,
    columns: Vec<Vec<Cell<'static>>>,
}

impl MemoryBatch {
    /// Build from columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<Vec<Cell<'static>>>) -> Result<Self, PluginError> {
        let rows = columns.first().map_or(0, Vec::len);
        if let Some((index, column)) = columns.iter().enumerate().find(|(_, c)| c.len() != rows) {
            return Err(PluginError::format(format!(
                "column {index} has {} rows, expected {rows}",
                column.len()
            )));
        }
        Ok(Self { rows, columns })
    }

    /// Build from rows. All rows must have the same number of cells.
    pub fn from_rows(rows: Vec<Vec<Cell<'static>>>) -> Result<Self, PluginError> {
        let width = rows.first().map_or(0, Vec::len);
        let mut columns: Vec<Vec<Cell<'static>>> =
            (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        let row_count = rows.len();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(PluginError::format(format!(
                    "row {index} has {} values, expected {width}",
                    row.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }
        Ok(Self { rows: row_count, columns })
    }

    /// A batch with `rows` rows and no columns.
    pub fn empty(rows: usize) -> Self {
        Self { rows, columns: Vec::new() }
    }
}

impl RowBatch for MemoryBatch {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn cell(&self, column: usize, row: usize) -> Cell<'_> {
        self.columns[column][row].clone()
    }
}
