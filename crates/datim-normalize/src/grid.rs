//! SQL view grid conversion.

use datim_common::optional_string_column;
use datim_model::{SqlViewGrid, cell_to_string};
use polars::prelude::*;

use crate::error::{NormalizeError, Result};

/// Converts a materialised SQL view into a DataFrame.
///
/// The header row supplies the column names; every cell is kept as text.
pub fn grid_to_dataframe(grid: &SqlViewGrid) -> Result<DataFrame> {
    let width = grid.headers.len();
    let mut cells: Vec<Vec<Option<String>>> = (0..width)
        .map(|_| Vec::with_capacity(grid.rows.len()))
        .collect();

    for (row_idx, row) in grid.rows.iter().enumerate() {
        if row.len() != width {
            return Err(NormalizeError::RowWidth {
                row: row_idx,
                expected: width,
                actual: row.len(),
            });
        }
        for (column, value) in cells.iter_mut().zip(row) {
            column.push(cell_to_string(value));
        }
    }

    let columns: Vec<Column> = grid
        .headers
        .iter()
        .zip(cells)
        .map(|(header, values)| optional_string_column(header.label(), values))
        .collect();

    tracing::debug!(
        rows = grid.rows.len(),
        columns = width,
        "Converted SQL view grid"
    );

    Ok(DataFrame::new(columns)?)
}
