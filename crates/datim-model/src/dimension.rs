//! Dimensions and dimension items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A queryable analytics axis (e.g. "Technical Area", "Funding Agency").
///
/// `name` is the stable human key; `id` is the opaque server key used in
/// query strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub name: String,
}

/// A valid value within a [`Dimension`] (e.g. "USAID" of "Funding Agency").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Display name. Served as `displayName` or `name` and renamed here.
    pub name: String,
    /// Id of the owning dimension.
    pub dimension_id: String,
    /// Additional requested fields, flattened to dotted keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dimension_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dimension_id: dimension_id.into(),
            extra: BTreeMap::new(),
        }
    }
}
