//! DATIM analytics data model.
//!
//! Type-safe representations of the values that flow through the analytics
//! pipeline:
//!
//! - [`dimension`]: dimensions and their items, as served by the catalog
//! - [`query`]: the caller's request and the composed query string
//! - [`result`]: raw analytics responses (rows, headers, metadata dictionary)
//! - [`sqlview`]: named server-side views and their parameters
//!
//! All types are per-call values; nothing here holds connection state.

pub mod dimension;
pub mod query;
pub mod result;
pub mod sqlview;

pub use dimension::{Dimension, Item};
pub use query::{
    ComposedQuery, DisplayProperty, LevelType, ParseLevelTypeError, QuerySpec,
    DISAGGREGATION_TYPE_DIMENSION, TARGETS_RESULTS_DIMENSION, TECHNICAL_AREA_DIMENSION,
};
pub use result::{
    Header, MetaData, MetaItem, ORG_UNIT_HEADER, RawResult, VALUE_HEADER, cell_to_string,
};
pub use sqlview::{SqlView, SqlViewGrid, SqlViewParamKind, SqlViewParams, SqlViewResponse};
