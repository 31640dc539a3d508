//! Request execution.
//!
//! [`QueryExecutor`] is the one place where network and parse failures are
//! turned into [`DatimError`] values and logged. Callers above it only see
//! parsed JSON or a typed error.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use datim_model::ComposedQuery;

use crate::error::{DatimError, Result};
use crate::transport::Transport;

/// Whether nested objects in a response are flattened into dotted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flatten {
    /// Keep the response as served.
    #[default]
    None,
    /// `{"a": {"b": 1}}` becomes `{"a.b": 1}`, inside arrays too.
    Nested,
}

/// Executes GET requests against one API root.
pub struct QueryExecutor {
    transport: Box<dyn Transport>,
    base_url: String,
}

impl QueryExecutor {
    pub fn new(base_url: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// API root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path such as `dimensions?paging=false`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Analytics URL for a composed query.
    #[must_use]
    pub fn analytics_url(&self, query: &ComposedQuery) -> String {
        self.api_url(&format!("analytics?{query}"))
    }

    /// Fetches `url` and parses the body as JSON.
    pub fn execute(&self, url: &str, flatten: Flatten) -> Result<Value> {
        let body = self.fetch(url)?;
        let value: Value = parse_body(url, &body)?;
        Ok(match flatten {
            Flatten::None => value,
            Flatten::Nested => flatten_value(value),
        })
    }

    /// Fetches `url` and deserializes the body into `T`.
    pub fn execute_as<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch(url)?;
        parse_body(url, &body)
    }

    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "Executing request");
        self.transport.get(url).inspect_err(|e| {
            warn!(url, error = %e, "Request failed");
        })
    }
}

fn parse_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        warn!(url, error = %e, "Response is not valid JSON");
        DatimError::from(e)
    })
}

fn flatten_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut flat = Map::new();
            flatten_into(&mut flat, None, map);
            Value::Object(flat)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(flatten_value).collect()),
        other => other,
    }
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, map: Map<String, Value>) {
    for (key, value) in map {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };
        match value {
            Value::Object(nested) => flatten_into(flat, Some(key.as_str()), nested),
            Value::Array(items) => {
                flat.insert(key, Value::Array(items.into_iter().map(flatten_value).collect()));
            }
            other => {
                flat.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Canned(&'static str);

    impl Transport for Canned {
        fn get(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl Transport for Failing {
        fn get(&self, url: &str) -> Result<String> {
            Err(DatimError::Timeout {
                url: url.to_string(),
            })
        }
    }

    #[test]
    fn test_api_url() {
        let executor = QueryExecutor::new("https://datim.test/api/", Box::new(Failing));
        assert_eq!(
            executor.api_url("dimensions?paging=false"),
            "https://datim.test/api/dimensions?paging=false"
        );
        assert_eq!(executor.api_url("/sqlViews"), "https://datim.test/api/sqlViews");
    }

    #[test]
    fn test_flatten_nested() {
        let executor = QueryExecutor::new(
            "https://datim.test/api",
            Box::new(Canned(
                r#"{"items":[{"id":"a","categoryCombo":{"id":"cc","name":{"en":"Default"}}}]}"#,
            )),
        );

        let value = executor.execute("https://datim.test/api/x", Flatten::Nested).unwrap();
        assert_eq!(
            value,
            json!({"items": [{"id": "a", "categoryCombo.id": "cc", "categoryCombo.name.en": "Default"}]})
        );
    }

    #[test]
    fn test_parse_failure_is_soft() {
        let executor = QueryExecutor::new("https://datim.test/api", Box::new(Canned("<html>")));
        let err = executor.execute("https://datim.test/api/x", Flatten::None).unwrap_err();
        assert!(matches!(err, DatimError::JsonParse(_)));
        assert!(err.is_soft());
    }

    #[test]
    fn test_transport_failure_propagates() {
        let executor = QueryExecutor::new("https://datim.test/api", Box::new(Failing));
        let err = executor.execute("https://datim.test/api/x", Flatten::None).unwrap_err();
        assert!(matches!(err, DatimError::Timeout { .. }));
        assert!(err.is_transport());
    }
}
