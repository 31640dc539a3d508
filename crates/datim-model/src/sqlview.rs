//! Named server-side SQL views.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use urlencoding::encode;

use crate::result::Header;

/// A named, pre-built server-side query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlView {
    pub uid: String,
    pub name: String,
}

impl fmt::Display for SqlView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uid)
    }
}

/// How parameters are substituted into a SQL view data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlViewParamKind {
    /// `&var=key:value` per pair, for views declaring `${key}` variables.
    Variable,
    /// `&filter=key:eq:value` per pair, filtering on view columns.
    Field,
    /// Unrecognised kind; the request is sent without parameters.
    Other(String),
}

impl From<&str> for SqlViewParamKind {
    fn from(kind: &str) -> Self {
        match kind {
            "variable" => Self::Variable,
            "field" => Self::Field,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SqlViewParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => f.write_str("variable"),
            Self::Field => f.write_str("field"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// Parameters for a SQL view data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlViewParams {
    pub kind: SqlViewParamKind,
    /// Key/value pairs in caller order.
    pub values: Vec<(String, String)>,
}

impl SqlViewParams {
    pub fn variables(values: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self::new(SqlViewParamKind::Variable, values)
    }

    pub fn fields(values: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self::new(SqlViewParamKind::Field, values)
    }

    pub fn new(
        kind: SqlViewParamKind,
        values: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            kind,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Query string suffix for these parameters, or `None` for an
    /// unrecognised kind. Keys and values are percent-encoded.
    #[must_use]
    pub fn query_suffix(&self) -> Option<String> {
        let suffix: String = match self.kind {
            SqlViewParamKind::Variable => self
                .values
                .iter()
                .map(|(k, v)| format!("&var={}:{}", encode(k), encode(v)))
                .collect(),
            SqlViewParamKind::Field => self
                .values
                .iter()
                .map(|(k, v)| format!("&filter={}:eq:{}", encode(k), encode(v)))
                .collect(),
            SqlViewParamKind::Other(_) => return None,
        };
        Some(suffix)
    }
}

/// Body of `GET /sqlViews/{uid}/data`: either a grid or a server status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SqlViewResponse {
    #[serde(default, rename = "listGrid")]
    pub list_grid: Option<SqlViewGrid>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Materialised SQL view rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SqlViewGrid {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_suffix() {
        let params = SqlViewParams::fields([("OU", "NG")]);
        assert_eq!(params.query_suffix().as_deref(), Some("&filter=OU:eq:NG"));
    }

    #[test]
    fn test_variable_suffix_keeps_order() {
        let params = SqlViewParams::variables([("year", "2024"), ("ou", "abc")]);
        assert_eq!(
            params.query_suffix().as_deref(),
            Some("&var=year:2024&var=ou:abc")
        );
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let params = SqlViewParams::fields([("OU", "A&B"), ("Partner name", "50%+#1")]);
        assert_eq!(
            params.query_suffix().as_deref(),
            Some("&filter=OU:eq:A%26B&filter=Partner%20name:eq:50%25%2B%231")
        );

        let params = SqlViewParams::variables([("ou", "a=b")]);
        assert_eq!(params.query_suffix().as_deref(), Some("&var=ou:a%3Db"));
    }

    #[test]
    fn test_unknown_kind_has_no_suffix() {
        let params = SqlViewParams::new(SqlViewParamKind::from("column"), [("a", "b")]);
        assert_eq!(params.kind, SqlViewParamKind::Other("column".to_string()));
        assert_eq!(params.query_suffix(), None);
    }

    #[test]
    fn test_status_response() {
        let response: SqlViewResponse = serde_json::from_str(
            r#"{"httpStatus":"Conflict","status":"ERROR","message":"View not materialized"}"#,
        )
        .unwrap();
        assert_eq!(response.status.as_deref(), Some("ERROR"));
        assert!(response.list_grid.is_none());
    }
}
