//! Output schema for normalized analytics tables.
//!
//! The full column set is decided here, before any column buffer is
//! allocated: the reinstated `orgunituid` column, one column per response
//! header, then one column per organisation hierarchy level.

use std::collections::BTreeMap;

use datim_model::Header;

/// Leading column holding the raw organisation unit codes.
pub const ORG_UNIT_UID_COLUMN: &str = "orgunituid";

/// Prefix of the positional hierarchy level columns (`orglvl_1`, ...).
pub const ORG_LEVEL_PREFIX: &str = "orglvl_";

/// Number of hierarchy columns needed for the given ancestor paths.
///
/// This is one more than the largest number of `/` separators in any path,
/// or `None` when there are no paths at all.
///
/// # Examples
///
/// ```
/// use datim_normalize::hierarchy_levels;
///
/// assert_eq!(hierarchy_levels(["/A/B/C", "/A"]), Some(4));
/// assert_eq!(hierarchy_levels(["A"]), Some(1));
/// assert_eq!(hierarchy_levels(Vec::<&str>::new()), None);
/// ```
pub fn hierarchy_levels<'a>(paths: impl IntoIterator<Item = &'a str>) -> Option<usize> {
    paths
        .into_iter()
        .map(|path| path.matches('/').count())
        .max()
        .map(|depth| depth + 1)
}

/// Column layout of the organisation hierarchy expansion.
#[derive(Debug, Clone)]
pub struct HierarchyLayout<'a> {
    paths: &'a BTreeMap<String, String>,
    names: Vec<String>,
}

impl<'a> HierarchyLayout<'a> {
    /// Builds the layout for an `ouHierarchy` map.
    ///
    /// `labels` replace the positional `orglvl_<k>` names only when there is
    /// exactly one label per level. Returns `None` for an empty map.
    pub fn new(paths: &'a BTreeMap<String, String>, labels: Option<&[String]>) -> Option<Self> {
        let levels = hierarchy_levels(paths.values().map(String::as_str))?;
        let names = match labels {
            Some(labels) if labels.len() == levels => labels.to_vec(),
            Some(labels) => {
                tracing::debug!(
                    levels,
                    labels = labels.len(),
                    "Level label count does not match hierarchy depth, using positional names"
                );
                positional_names(levels)
            }
            None => positional_names(levels),
        };
        Some(Self { paths, names })
    }

    #[must_use]
    pub fn levels(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Splits the ancestor path of `org_unit` into one cell per level.
    ///
    /// Units without a path, empty segments, and levels deeper than the path
    /// all yield `None`.
    #[must_use]
    pub fn expand(&self, org_unit: Option<&str>) -> Vec<Option<String>> {
        let mut cells = vec![None; self.levels()];
        if let Some(path) = org_unit.and_then(|code| self.paths.get(code)) {
            for (cell, segment) in cells.iter_mut().zip(path.split('/')) {
                if !segment.is_empty() {
                    *cell = Some(segment.to_string());
                }
            }
        }
        cells
    }
}

fn positional_names(levels: usize) -> Vec<String> {
    (1..=levels)
        .map(|level| format!("{ORG_LEVEL_PREFIX}{level}"))
        .collect()
}

/// Final column names of a normalized table, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<String>,
}

impl TableSchema {
    /// Computes the column names, keeping every name unique.
    ///
    /// A header whose label is already taken falls back to its API name, and
    /// a level label that is already taken falls back to `orglvl_<k>`. When
    /// the fallback is taken too, a numeric suffix is appended.
    pub fn build(headers: &[Header], hierarchy: Option<&HierarchyLayout<'_>>) -> Self {
        let extra = hierarchy.map_or(0, HierarchyLayout::levels);
        let mut schema = Self {
            columns: Vec::with_capacity(1 + headers.len() + extra),
        };
        schema.push(&[ORG_UNIT_UID_COLUMN]);
        for header in headers {
            schema.push(&[header.label(), header.name.as_str()]);
        }
        if let Some(layout) = hierarchy {
            for (idx, name) in layout.names().iter().enumerate() {
                let positional = format!("{ORG_LEVEL_PREFIX}{}", idx + 1);
                schema.push(&[name.as_str(), positional.as_str()]);
            }
        }
        schema
    }

    fn push(&mut self, candidates: &[&str]) {
        let preferred = candidates.first().copied().unwrap_or_default();
        let name = match candidates.iter().find(|name| !self.contains(name)) {
            Some(name) => (*name).to_string(),
            None => {
                let base = candidates.last().copied().unwrap_or_default();
                (2..)
                    .map(|n| format!("{base}_{n}"))
                    .find(|name| !self.contains(name))
                    .unwrap_or_default()
            }
        };
        if name != preferred {
            tracing::warn!(column = preferred, renamed = %name, "Duplicate column name");
        }
        self.columns.push(name);
    }

    fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
