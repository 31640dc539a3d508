//! Top-level analytics client.

use polars::prelude::DataFrame;
use tracing::{debug, error, info};

use datim_model::{DisplayProperty, QuerySpec, RawResult};
use datim_normalize::{NormalizeOptions, hierarchy_levels, normalize};

use crate::catalog::DimensionCatalog;
use crate::composer::QueryComposer;
use crate::config::DatimConfig;
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::orgunit::OrgUnitDirectory;
use crate::sqlview::SqlViewResolver;
use crate::transport::{HttpTransport, Transport};

/// Analytics client bound to one server and one set of credentials.
pub struct DatimClient {
    executor: QueryExecutor,
    display_property: DisplayProperty,
}

impl DatimClient {
    /// Creates a client that talks HTTP to `config.base_url`.
    pub fn new(config: &DatimConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(
            &config.base_url,
            config.display_property,
            Box::new(transport),
        ))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(
        base_url: &str,
        display_property: DisplayProperty,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            executor: QueryExecutor::new(base_url, transport),
            display_property,
        }
    }

    /// Default display property for specs built by callers of this client.
    #[must_use]
    pub fn display_property(&self) -> DisplayProperty {
        self.display_property
    }

    #[must_use]
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    #[must_use]
    pub fn catalog(&self) -> DimensionCatalog<'_> {
        DimensionCatalog::new(&self.executor)
    }

    #[must_use]
    pub fn composer<'a>(&'a self, org_units: &'a dyn OrgUnitDirectory) -> QueryComposer<'a> {
        QueryComposer::new(self.catalog(), org_units)
    }

    #[must_use]
    pub fn sql_views(&self) -> SqlViewResolver<'_> {
        SqlViewResolver::new(&self.executor)
    }

    /// Fetches the raw analytics response for `spec`.
    pub fn fetch_raw(&self, spec: &QuerySpec, org_units: &dyn OrgUnitDirectory) -> Result<RawResult> {
        let query = self.composer(org_units).build_query(spec)?;
        let url = self.executor.analytics_url(&query);
        self.executor.execute_as(&url)
    }

    /// Runs the whole pipeline: resolve names, compose, execute, normalize.
    ///
    /// Returns `Ok(None)` when the server has no rows for the query.
    pub fn query(
        &self,
        spec: &QuerySpec,
        org_units: &dyn OrgUnitDirectory,
    ) -> Result<Option<DataFrame>> {
        let raw = self.fetch_raw(spec, org_units)?;
        debug!(rows = raw.rows.len(), headers = raw.headers.len(), "Fetched analytics response");

        let options = if spec.hierarchy {
            let options = NormalizeOptions::with_hierarchy();
            match level_labels(&raw, &spec.org_unit, org_units) {
                Some(labels) => options.with_level_labels(labels),
                None => options,
            }
        } else {
            NormalizeOptions::default()
        };

        let table = normalize(&raw, &options).inspect_err(|e| {
            error!(org_unit = %spec.org_unit, error = %e, "Failed to normalize analytics response");
        })?;
        if let Some(table) = &table {
            info!(
                org_unit = %spec.org_unit,
                rows = table.height(),
                columns = table.width(),
                "Query complete"
            );
        }
        Ok(table)
    }
}

/// Labels for every hierarchy level of the response, when the directory has
/// one for each.
fn level_labels(
    raw: &RawResult,
    org_unit: &str,
    org_units: &dyn OrgUnitDirectory,
) -> Option<Vec<String>> {
    let paths = raw.meta_data.ou_hierarchy.as_ref()?;
    let levels = hierarchy_levels(paths.values().map(String::as_str))?;
    (1..=levels)
        .map(|level| org_units.org_level_label(org_unit, level))
        .collect()
}
