//! SQL view lookup and materialisation.

use polars::prelude::DataFrame;
use serde::Deserialize;
use tracing::{debug, error, warn};

use datim_model::{SqlView, SqlViewParamKind, SqlViewParams, SqlViewResponse};
use datim_normalize::grid_to_dataframe;

use crate::error::{DatimError, Result};
use crate::executor::QueryExecutor;

/// Wire shape of `GET /sqlViews`.
#[derive(Debug, Deserialize)]
struct SqlViewList {
    #[serde(default, rename = "sqlViews")]
    sql_views: Vec<SqlViewRecord>,
}

#[derive(Debug, Deserialize)]
struct SqlViewRecord {
    id: String,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<SqlViewRecord> for SqlView {
    fn from(record: SqlViewRecord) -> Self {
        Self {
            name: record.display_name.or(record.name).unwrap_or_default(),
            uid: record.id,
        }
    }
}

/// Finds named SQL views and fetches their rows.
pub struct SqlViewResolver<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> SqlViewResolver<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Every SQL view on the server.
    pub fn list_sql_views(&self) -> Result<Vec<SqlView>> {
        let url = self.executor.api_url("sqlViews?format=json&paging=false");
        let list: SqlViewList = self.executor.execute_as(&url)?;
        Ok(list.sql_views.into_iter().map(SqlView::from).collect())
    }

    /// The single view with exactly this name.
    ///
    /// No match is [`DatimError::SqlViewNotFound`]; several matches are
    /// [`DatimError::AmbiguousSqlView`] carrying every candidate.
    pub fn find(&self, name: &str) -> Result<SqlView> {
        let mut matches: Vec<SqlView> = self
            .list_sql_views()?
            .into_iter()
            .filter(|view| view.name == name)
            .collect();

        match matches.len() {
            0 => {
                warn!(name, "SQL view not found");
                Err(DatimError::SqlViewNotFound(name.to_string()))
            }
            1 => Ok(matches.remove(0)),
            count => {
                let candidates = matches
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                warn!(name, count, %candidates, "More than one SQL view matches");
                Err(DatimError::AmbiguousSqlView {
                    name: name.to_string(),
                    candidates: matches,
                })
            }
        }
    }

    /// Uid of the single view with exactly this name.
    pub fn sql_view_id(&self, name: &str) -> Result<String> {
        self.find(name).map(|view| view.uid)
    }

    /// Data URL of a view, with parameters substituted.
    ///
    /// An unrecognised parameter kind is logged and the URL is built without
    /// parameters.
    #[must_use]
    pub fn dataset_url(&self, uid: &str, params: Option<&SqlViewParams>) -> String {
        let mut path = format!("sqlViews/{uid}/data?format=json&paging=false&fields=*");
        if let Some(params) = params {
            match params.query_suffix() {
                Some(suffix) => path.push_str(&suffix),
                None => {
                    if let SqlViewParamKind::Other(kind) = &params.kind {
                        error!(uid, kind = %kind, "Unknown SQL view parameter kind; fetching without parameters");
                    }
                }
            }
        }
        self.executor.api_url(&path)
    }

    /// Materialises the named view as a table of text columns.
    pub fn fetch_dataset(&self, name: &str, params: Option<&SqlViewParams>) -> Result<DataFrame> {
        let view = self.find(name)?;
        let url = self.dataset_url(&view.uid, params);
        let response: SqlViewResponse = self.executor.execute_as(&url)?;

        if let Some(status) = response.status {
            let message = response.message.unwrap_or_default();
            warn!(view = %view, %status, %message, "SQL view request reported an error");
            return Err(DatimError::ServerStatus { status, message });
        }

        let grid = response.list_grid.ok_or_else(|| {
            warn!(view = %view, "SQL view response has no listGrid");
            DatimError::JsonParse("response has neither listGrid nor status".to_string())
        })?;

        let frame = grid_to_dataframe(&grid)?;
        debug!(view = %view, rows = frame.height(), "Fetched SQL view");
        Ok(frame)
    }
}
