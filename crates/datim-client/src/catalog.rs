//! Dimension and item name resolution.
//!
//! The catalog is fetched on every call; nothing is cached between lookups.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use datim_model::{Dimension, Item, cell_to_string};

use crate::error::{DatimError, Result};
use crate::executor::{Flatten, QueryExecutor};

/// Keys holding the item display name, in order of preference.
const NAME_KEYS: [&str; 2] = ["displayName", "name"];

/// Wire shape of `GET /dimensions`.
#[derive(Debug, Deserialize)]
struct DimensionList {
    #[serde(default)]
    dimensions: Vec<DimensionRecord>,
}

#[derive(Debug, Deserialize)]
struct DimensionRecord {
    id: String,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<DimensionRecord> for Dimension {
    fn from(record: DimensionRecord) -> Self {
        Self {
            name: record.display_name.or(record.name).unwrap_or_default(),
            id: record.id,
        }
    }
}

/// Resolves dimension and item names against the server catalog.
pub struct DimensionCatalog<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> DimensionCatalog<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Every dimension known to the server, in server order.
    pub fn list_dimensions(&self) -> Result<Vec<Dimension>> {
        let url = self.executor.api_url("dimensions?paging=false");
        let list: DimensionList = self.executor.execute_as(&url)?;
        debug!(count = list.dimensions.len(), "Fetched dimensions");
        Ok(list.dimensions.into_iter().map(Dimension::from).collect())
    }

    /// Looks up a dimension by exact, case-sensitive name.
    pub fn resolve_dimension(&self, name: &str) -> Result<Dimension> {
        self.list_dimensions()?
            .into_iter()
            .find(|dimension| dimension.name == name)
            .ok_or_else(|| {
                warn!(dimension = name, "Dimension not found");
                DatimError::DimensionNotFound(name.to_string())
            })
    }

    /// Resolves a dimension and fetches its items.
    ///
    /// `fields` is percent-encoded into the `fields` query parameter; nested
    /// objects in the answer are flattened into [`Item::extra`]. Any failure,
    /// including an empty list, is [`DatimError::ItemListUnavailable`].
    pub fn dimension_items(&self, name: &str, fields: Option<&str>) -> Result<(Dimension, Vec<Item>)> {
        let unavailable = |reason: String| {
            error!(dimension = name, %reason, "Item list unavailable");
            DatimError::ItemListUnavailable {
                dimension: name.to_string(),
                reason,
            }
        };

        let dimension = self
            .resolve_dimension(name)
            .map_err(|e| unavailable(e.to_string()))?;

        let mut path = format!("dimensions/{}/items?paging=false", dimension.id);
        let flatten = match fields {
            Some(fields) => {
                path.push_str("&fields=");
                path.push_str(&urlencoding::encode(fields));
                Flatten::Nested
            }
            None => Flatten::None,
        };

        let url = self.executor.api_url(&path);
        let body = self
            .executor
            .execute(&url, flatten)
            .map_err(|e| unavailable(e.to_string()))?;

        let items = parse_items(&dimension.id, &body)
            .ok_or_else(|| unavailable("response has no items array".to_string()))?;
        if items.is_empty() {
            return Err(unavailable("empty item list".to_string()));
        }

        debug!(dimension = name, count = items.len(), "Fetched items");
        Ok((dimension, items))
    }

    /// Items of the named dimension, in catalog order.
    pub fn list_items(&self, name: &str, fields: Option<&str>) -> Result<Vec<Item>> {
        self.dimension_items(name, fields).map(|(_, items)| items)
    }

    /// Id of the named item. A miss is a hard failure.
    pub fn resolve_item(&self, dimension: &str, item: &str) -> Result<String> {
        let items = self.list_items(dimension, None)?;
        find_item(dimension, &items, item, |candidate| &candidate.name).map(|found| found.id.clone())
    }

    /// Display name of the item with this id.
    pub fn item_name(&self, dimension: &str, item_id: &str) -> Result<String> {
        let items = self.list_items(dimension, None)?;
        find_item(dimension, &items, item_id, |candidate| &candidate.id)
            .map(|found| found.name.clone())
    }
}

/// Finds an item by a key, logging and returning a hard miss otherwise.
pub(crate) fn find_item<'i>(
    dimension: &str,
    items: &'i [Item],
    wanted: &str,
    key: impl Fn(&Item) -> &String,
) -> Result<&'i Item> {
    items.iter().find(|item| key(item) == wanted).ok_or_else(|| {
        error!(dimension, item = wanted, "Item not found");
        DatimError::ItemNotFound {
            dimension: dimension.to_string(),
            item: wanted.to_string(),
        }
    })
}

fn parse_items(dimension_id: &str, body: &Value) -> Option<Vec<Item>> {
    let records = body.get("items")?.as_array()?;
    let items = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| parse_item(dimension_id, record))
        .collect();
    Some(items)
}

fn parse_item(dimension_id: &str, record: &Map<String, Value>) -> Option<Item> {
    let id = record.get("id").and_then(cell_to_string)?;
    let name = NAME_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(cell_to_string))
        .unwrap_or_default();

    let extra: BTreeMap<String, String> = record
        .iter()
        .filter(|(key, _)| key.as_str() != "id" && !NAME_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| cell_to_string(value).map(|value| (key.clone(), value)))
        .collect();

    Some(Item {
        id,
        name,
        dimension_id: dimension_id.to_string(),
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_items_renames_display_field() {
        let body = json!({"items": [
            {"id": "a1", "displayName": "Targets", "name": "Targets (long)"},
            {"id": "a2", "name": "Results"},
            {"name": "no id"}
        ]});

        let items = parse_items("dimTR", &body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Item::new("a1", "Targets", "dimTR"));
        assert_eq!(items[1].name, "Results");
    }

    #[test]
    fn test_parse_items_keeps_extra_fields() {
        let body = json!({"items": [
            {"id": "a1", "displayName": "HTS_TST", "code": "HTS", "categoryCombo.id": "cc1"}
        ]});

        let items = parse_items("dimTA", &body).unwrap();
        assert_eq!(items[0].extra["code"], "HTS");
        assert_eq!(items[0].extra["categoryCombo.id"], "cc1");
        assert!(!items[0].extra.contains_key("displayName"));
    }

    #[test]
    fn test_parse_items_requires_array() {
        assert!(parse_items("d", &json!({"httpStatus": "OK"})).is_none());
    }

    #[test]
    fn test_find_item_miss_names_both_inputs() {
        let items = vec![Item::new("a1", "Targets", "dimTR")];
        let err = find_item("Targets / Results", &items, "Budget", |item| &item.name).unwrap_err();
        assert!(!err.is_soft());
        let message = err.to_string();
        assert!(message.contains("Targets / Results"));
        assert!(message.contains("Budget"));
    }
}
