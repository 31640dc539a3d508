//! Analytics response normalization.
//!
//! Converts a [`RawResult`] into a labelled DataFrame: codes become display
//! names, the value column becomes numeric, the organisation hierarchy is
//! expanded into level columns, and the raw org unit codes are kept as the
//! leading `orgunituid` join key.

use std::collections::HashMap;

use datim_common::{optional_string_column, parse_f64};
use datim_model::{MetaData, ORG_UNIT_HEADER, RawResult, VALUE_HEADER, cell_to_string};
use polars::prelude::*;

use crate::error::{NormalizeError, Result};
use crate::schema::{HierarchyLayout, ORG_UNIT_UID_COLUMN, TableSchema};

/// Options controlling normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Expand `metaData.ouHierarchy` into level columns.
    pub hierarchy: bool,
    /// Names for the hierarchy level columns, one per level.
    pub level_labels: Option<Vec<String>>,
}

impl NormalizeOptions {
    #[must_use]
    pub fn with_hierarchy() -> Self {
        Self {
            hierarchy: true,
            level_labels: None,
        }
    }

    #[must_use]
    pub fn with_level_labels(mut self, labels: Vec<String>) -> Self {
        self.level_labels = Some(labels);
        self
    }
}

/// Normalize an analytics response into a labelled table.
///
/// Returns `Ok(None)` when the response has no rows.
pub fn normalize(raw: &RawResult, options: &NormalizeOptions) -> Result<Option<DataFrame>> {
    if raw.rows.is_empty() {
        tracing::info!(headers = raw.headers.len(), "No data returned for query");
        return Ok(None);
    }

    let org_unit_idx = raw
        .header_index(ORG_UNIT_HEADER)
        .ok_or_else(|| NormalizeError::MissingColumn(ORG_UNIT_HEADER.to_string()))?;
    let value_idx = raw.header_index(VALUE_HEADER);

    let layout = if options.hierarchy {
        hierarchy_layout(&raw.meta_data, options.level_labels.as_deref())
    } else {
        None
    };
    let schema = TableSchema::build(&raw.headers, layout.as_ref());

    let width = raw.headers.len();
    let row_count = raw.rows.len();
    let mut cells: Vec<Vec<Option<String>>> =
        (0..width).map(|_| Vec::with_capacity(row_count)).collect();
    let mut levels: Vec<Vec<Option<String>>> = layout
        .as_ref()
        .map(|l| (0..l.levels()).map(|_| Vec::with_capacity(row_count)).collect())
        .unwrap_or_default();
    let mut orguids: Vec<Option<String>> = Vec::with_capacity(row_count);

    for (row_idx, row) in raw.rows.iter().enumerate() {
        if row.len() != width {
            return Err(NormalizeError::RowWidth {
                row: row_idx,
                expected: width,
                actual: row.len(),
            });
        }

        let org_unit = cell_to_string(&row[org_unit_idx]);
        if let Some(layout) = &layout {
            for (column, cell) in levels.iter_mut().zip(layout.expand(org_unit.as_deref())) {
                column.push(cell);
            }
        }
        orguids.push(org_unit);

        for (column, value) in cells.iter_mut().zip(row) {
            column.push(cell_to_string(value));
        }
    }

    let mut substitution = Substitution::new(&raw.meta_data);
    for (idx, column) in cells.iter_mut().enumerate() {
        if Some(idx) != value_idx {
            substitution.apply(column);
        }
    }
    for column in &mut levels {
        substitution.apply(column);
    }
    if substitution.unmapped > 0 {
        tracing::info!(
            substituted = substitution.substituted,
            unmapped = substitution.unmapped,
            "Cells without a metadata name were left unchanged"
        );
    }

    let mut names = schema.columns().iter();
    let mut columns: Vec<Column> = Vec::with_capacity(schema.width());

    let uid_name = names.next().map_or(ORG_UNIT_UID_COLUMN, String::as_str);
    columns.push(optional_string_column(uid_name, orguids));

    for (idx, (values, name)) in cells.into_iter().zip(names.by_ref()).enumerate() {
        if Some(idx) == value_idx {
            columns.push(numeric_column(name, &values));
        } else {
            columns.push(optional_string_column(name, values));
        }
    }
    for (values, name) in levels.into_iter().zip(names) {
        columns.push(optional_string_column(name, values));
    }

    Ok(Some(DataFrame::new(columns)?))
}

fn hierarchy_layout<'a>(
    meta_data: &'a MetaData,
    labels: Option<&[String]>,
) -> Option<HierarchyLayout<'a>> {
    let Some(paths) = meta_data.ou_hierarchy.as_ref() else {
        tracing::warn!("Hierarchy requested but response has no ouHierarchy metadata");
        return None;
    };
    HierarchyLayout::new(paths, labels)
}

/// Coerce value cells to `f64`. Empty and malformed cells become null.
fn numeric_column(name: &str, values: &[Option<String>]) -> Column {
    let mut malformed = 0usize;
    let numbers: Vec<Option<f64>> = values
        .iter()
        .map(|cell| match cell.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_f64(raw);
                if parsed.is_none() && !raw.trim().is_empty() {
                    malformed += 1;
                }
                parsed
            }
        })
        .collect();

    if malformed > 0 {
        tracing::warn!(
            column = %name,
            malformed,
            "Non-numeric values set to null"
        );
    }

    Series::new(name.into(), numbers).into_column()
}

/// Best-effort code → display name substitution with counters.
struct Substitution<'a> {
    names: HashMap<&'a str, &'a str>,
    substituted: usize,
    unmapped: usize,
}

impl<'a> Substitution<'a> {
    fn new(meta_data: &'a MetaData) -> Self {
        let names = meta_data
            .items
            .iter()
            .filter_map(|(code, item)| Some((code.as_str(), item.name.as_deref()?)))
            .collect();
        Self {
            names,
            substituted: 0,
            unmapped: 0,
        }
    }

    fn apply(&mut self, column: &mut [Option<String>]) {
        for cell in column.iter_mut().flatten() {
            match self.names.get(cell.as_str()) {
                Some(name) => {
                    *cell = (*name).to_string();
                    self.substituted += 1;
                }
                None => self.unmapped += 1,
            }
        }
    }
}
