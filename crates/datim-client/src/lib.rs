//! Client for DATIM/DHIS2 dimensional analytics.
//!
//! The pipeline resolves human-readable names to server identifiers, composes
//! one analytics query, executes it, and normalizes the code-keyed answer into
//! a labelled Polars table:
//!
//! - [`catalog`]: dimension and item name resolution
//! - [`composer`]: query string assembly
//! - [`executor`]: authenticated requests and JSON parsing
//! - [`sqlview`]: named SQL view lookup and materialisation
//!
//! Failures are [`DatimError`] values with a [`Severity`]: soft errors mean a
//! value is absent, hard errors mean the operation was aborted.
//!
//! # Example
//!
//! ```no_run
//! use datim_client::{Credentials, DatimClient, DatimConfig, StaticOrgUnits};
//! use datim_model::{LevelType, QuerySpec};
//!
//! let config = DatimConfig::new("https://www.datim.org/api", Credentials::new("me", "secret"));
//! let client = DatimClient::new(&config)?;
//! let org_units = StaticOrgUnits::new()
//!     .with_unit("Nigeria", "PqlFzhuPcF1")
//!     .with_level("Nigeria", LevelType::Prioritization, 4);
//!
//! let spec = QuerySpec::new("Nigeria", "PLHIV", ["THIS_FINANCIAL_YEAR"])
//!     .with_level(LevelType::Prioritization);
//! if let Some(table) = client.query(&spec, &org_units)? {
//!     println!("{table}");
//! }
//! # Ok::<(), datim_client::DatimError>(())
//! ```

pub mod catalog;
pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod executor;
pub mod orgunit;
pub mod sqlview;
pub mod transport;

pub use catalog::DimensionCatalog;
pub use client::DatimClient;
pub use composer::QueryComposer;
pub use config::{Credentials, DatimConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{DatimError, Result, Severity};
pub use executor::{Flatten, QueryExecutor};
pub use orgunit::{OrgUnitDirectory, OrgUnitEntry, OrgUnitLevels, StaticOrgUnits};
pub use sqlview::SqlViewResolver;
pub use transport::{HttpTransport, Transport};
