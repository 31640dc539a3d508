//! Table rendering and CSV export.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use datim_common::frame_to_rows;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

/// A styled table with `header` and `rows`.
pub fn simple_table<I, R>(header: &[&str], rows: I) -> Table
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut table = Table::new();
    table.set_header(header.to_vec());
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row.into_iter().collect::<Vec<_>>());
    }
    table
}

/// Renders every row of `df` with its column names as the header.
pub fn frame_table(df: &DataFrame) -> Result<Table> {
    let names: Vec<&str> = df.get_column_names().iter().map(|name| name.as_str()).collect();
    let rows = frame_to_rows(df).context("read table rows")?;
    Ok(simple_table(&names, rows))
}

/// Writes `df` as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
