//! Analytics query composition.

use std::slice;

use tracing::{debug, error, warn};

use datim_model::{
    ComposedQuery, DISAGGREGATION_TYPE_DIMENSION, QuerySpec, TARGETS_RESULTS_DIMENSION,
    TECHNICAL_AREA_DIMENSION,
};

use crate::catalog::{DimensionCatalog, find_item};
use crate::error::{DatimError, Result};
use crate::orgunit::OrgUnitDirectory;

/// Builds analytics query strings from a [`QuerySpec`].
pub struct QueryComposer<'a> {
    catalog: DimensionCatalog<'a>,
    org_units: &'a dyn OrgUnitDirectory,
}

impl<'a> QueryComposer<'a> {
    pub fn new(catalog: DimensionCatalog<'a>, org_units: &'a dyn OrgUnitDirectory) -> Self {
        Self { catalog, org_units }
    }

    /// `dimension=<dimId>:<id1>;<id2>...` for the named dimension.
    ///
    /// Item ids follow the order of `items`. `None` or an empty slice selects
    /// every item in catalog order. The item list is fetched once.
    pub fn dimension_selector(&self, dimension: &str, items: Option<&[String]>) -> Result<String> {
        let (resolved, catalog_items) = self.catalog.dimension_items(dimension, None)?;

        let ids: Vec<&str> = match items {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| {
                    find_item(dimension, &catalog_items, name, |item| &item.name)
                        .map(|item| item.id.as_str())
                })
                .collect::<Result<_>>()?,
            _ => catalog_items.iter().map(|item| item.id.as_str()).collect(),
        };

        Ok(format!("dimension={}:{}", resolved.id, ids.join(";")))
    }

    /// Full selectors for several dimensions, joined with `&`.
    pub fn dimension_selectors(&self, dimensions: &[String]) -> Result<String> {
        let selectors = dimensions
            .iter()
            .map(|dimension| self.dimension_selector(dimension, None))
            .collect::<Result<Vec<_>>>()?;
        Ok(selectors.join("&"))
    }

    /// Resolves every name in `spec` and assembles the query sections.
    pub fn build_query(&self, spec: &QuerySpec) -> Result<ComposedQuery> {
        if spec.periods.is_empty() {
            error!(org_unit = %spec.org_unit, "Query has no periods");
            return Err(DatimError::InvalidQuery("at least one period is required".to_string()));
        }

        let core = self.core_section(spec)?;

        let technical_area = self.dimension_selector(
            TECHNICAL_AREA_DIMENSION,
            Some(slice::from_ref(&spec.technical_area)),
        )?;
        let value_types =
            self.dimension_selector(TARGETS_RESULTS_DIMENSION, Some(spec.value_types.as_slice()))?;
        let type_section = format!(
            "dimension=pe:{}&{technical_area}&{value_types}",
            spec.periods.join(";")
        );

        let disaggs = spec
            .disaggregations
            .iter()
            .map(|name| {
                self.dimension_selector(DISAGGREGATION_TYPE_DIMENSION, Some(slice::from_ref(name)))
            })
            .collect::<Result<Vec<_>>>()?;

        let dims = if disaggs.is_empty() {
            if !spec.dimensions.is_empty() {
                warn!(
                    dimensions = ?spec.dimensions,
                    "Dimensions ignored because no disaggregation was requested"
                );
            }
            Vec::new()
        } else {
            spec.dimensions
                .iter()
                .map(|dimension| self.dimension_selector(dimension, None))
                .collect::<Result<Vec<_>>>()?
        };

        let query = ComposedQuery::new(core, type_section, disaggs, dims, meta_section(spec));
        debug!(query = %query, "Composed analytics query");
        Ok(query)
    }

    fn core_section(&self, spec: &QuerySpec) -> Result<String> {
        let org_unit_id = self.org_units.org_unit_id(&spec.org_unit).ok_or_else(|| {
            warn!(org_unit = %spec.org_unit, "Org unit not found");
            DatimError::OrgUnitNotFound(spec.org_unit.clone())
        })?;

        let level = self
            .org_units
            .org_level(&spec.org_unit, spec.level)
            .ok_or_else(|| {
                warn!(org_unit = %spec.org_unit, level_type = %spec.level, "Org level not found");
                DatimError::OrgLevelNotFound {
                    org_unit: spec.org_unit.clone(),
                    level_type: spec.level,
                }
            })?;

        Ok(format!("dimension=ou:{org_unit_id};LEVEL-{level}"))
    }
}

fn meta_section(spec: &QuerySpec) -> String {
    format!(
        "displayProperty={}&skipMeta={}&hierarchyMeta={}",
        spec.display_property.as_param(),
        !spec.include_metadata,
        spec.hierarchy
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use datim_model::{DisplayProperty, LevelType};

    use crate::executor::QueryExecutor;
    use crate::orgunit::StaticOrgUnits;
    use crate::transport::Transport;

    struct Unreachable;

    impl Transport for Unreachable {
        fn get(&self, url: &str) -> Result<String> {
            panic!("unexpected request to {url}");
        }
    }

    #[test]
    fn test_meta_section() {
        let spec = QuerySpec::new("Nigeria", "PLHIV", ["THIS_FINANCIAL_YEAR"]);
        assert_eq!(
            meta_section(&spec),
            "displayProperty=SHORTNAME&skipMeta=false&hierarchyMeta=false"
        );

        let spec = spec
            .with_display_property(DisplayProperty::Name)
            .with_metadata(false)
            .with_hierarchy(true);
        assert_eq!(
            meta_section(&spec),
            "displayProperty=NAME&skipMeta=true&hierarchyMeta=true"
        );
    }

    #[test]
    fn test_empty_periods_rejected_before_any_request() {
        let executor = QueryExecutor::new("https://datim.test/api", Box::new(Unreachable));
        let org_units = StaticOrgUnits::new();
        let composer = QueryComposer::new(DimensionCatalog::new(&executor), &org_units);

        let spec = QuerySpec::new("Nigeria", "PLHIV", Vec::<String>::new());
        let err = composer.build_query(&spec).unwrap_err();
        assert!(matches!(err, DatimError::InvalidQuery(_)));
    }

    #[test]
    fn test_org_unit_miss_is_soft() {
        let executor = QueryExecutor::new("https://datim.test/api", Box::new(Unreachable));
        let org_units = StaticOrgUnits::new().with_unit("Nigeria", "PqlFzhuPcF1");
        let composer = QueryComposer::new(DimensionCatalog::new(&executor), &org_units);

        let err = composer
            .build_query(&QuerySpec::new("Kenya", "PLHIV", ["2024Oct"]))
            .unwrap_err();
        assert!(matches!(err, DatimError::OrgUnitNotFound(ref name) if name == "Kenya"));
        assert!(err.is_soft());

        let err = composer
            .build_query(
                &QuerySpec::new("Nigeria", "PLHIV", ["2024Oct"]).with_level(LevelType::Facility),
            )
            .unwrap_err();
        assert!(matches!(err, DatimError::OrgLevelNotFound { .. }));
        assert!(err.is_soft());
    }
}
