//! Raw analytics response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header name of the organisation unit column in analytics responses.
pub const ORG_UNIT_HEADER: &str = "ou";

/// Header name of the numeric value column in analytics responses.
pub const VALUE_HEADER: &str = "value";

/// A raw `GET /analytics` payload: code-keyed rows plus a metadata dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default, rename = "metaData")]
    pub meta_data: MetaData,
}

impl RawResult {
    /// Position of the header with the given API name.
    #[must_use]
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.name == name)
    }
}

/// One response column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// API name (`ou`, `pe`, `value`, or a dimension id).
    pub name: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl Header {
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: Some(column.into()),
        }
    }

    /// Column label used in tables: `column` when present, else `name`.
    #[must_use]
    pub fn label(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// The `metaData` block of an analytics response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    /// Code → display entry.
    #[serde(default)]
    pub items: BTreeMap<String, MetaItem>,
    /// Org unit code → "/"-delimited ancestor path. Present when
    /// `hierarchyMeta=true` was requested.
    #[serde(default, rename = "ouHierarchy", skip_serializing_if = "Option::is_none")]
    pub ou_hierarchy: Option<BTreeMap<String, String>>,
}

/// A metadata dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaItem {
    /// Display name. Entries without one do not rename anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Renders a JSON cell as text. `null` yields `None`.
#[must_use]
pub fn cell_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
