//! Analytics result normalization.
//!
//! Turns raw analytics payloads (code-keyed rows plus a metadata dictionary)
//! into human-labelled Polars DataFrames.
//!
//! # Overview
//!
//! - **Schema building**: the final column set, including the dynamically
//!   sized organisation hierarchy expansion, is computed up front
//! - **Code substitution**: every cell except the value column is replaced by
//!   its display name; unmapped cells pass through and are counted
//! - **Numeric coercion**: the value column becomes `f64`, malformed values
//!   become null
//! - **SQL view grids**: materialised view rows become a string DataFrame
//!
//! # Example
//!
//! ```ignore
//! use datim_normalize::{normalize, NormalizeOptions};
//!
//! let raw: datim_model::RawResult = serde_json::from_str(body)?;
//! if let Some(df) = normalize(&raw, &NormalizeOptions::with_hierarchy())? {
//!     println!("{df}");
//! }
//! ```

mod error;
mod executor;
mod grid;
mod schema;

pub use error::{NormalizeError, Result};
pub use executor::{NormalizeOptions, normalize};
pub use grid::grid_to_dataframe;
pub use schema::{
    HierarchyLayout, ORG_LEVEL_PREFIX, ORG_UNIT_UID_COLUMN, TableSchema, hierarchy_levels,
};
