//! Error types for the analytics client.

use datim_model::{LevelType, SqlView};
use datim_normalize::NormalizeError;
use thiserror::Error;

/// How a failure affects the operation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The requested value is absent; the caller may carry on without it.
    Soft,
    /// The in-progress operation cannot produce a correct result and was
    /// aborted.
    Hard,
}

/// Errors that can occur while resolving, composing, or executing queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatimError {
    /// Configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request could not be completed.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out: {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// No dimension has this name.
    #[error("dimension '{0}' not found")]
    DimensionNotFound(String),

    /// The item list of a dimension could not be obtained or was empty.
    #[error("items for dimension '{dimension}' unavailable: {reason}")]
    ItemListUnavailable {
        /// Requested dimension name.
        dimension: String,
        /// Why the list is unavailable.
        reason: String,
    },

    /// No item of the dimension has this name (or id, for reverse lookups).
    #[error("item '{item}' not found in dimension '{dimension}'")]
    ItemNotFound {
        /// Dimension searched.
        dimension: String,
        /// Item name or id that did not match.
        item: String,
    },

    /// The org unit collaborator does not know this org unit.
    #[error("org unit '{0}' not found")]
    OrgUnitNotFound(String),

    /// The org unit collaborator has no level of this type for the org unit.
    #[error("no {level_type} level for org unit '{org_unit}'")]
    OrgLevelNotFound {
        /// Org unit name.
        org_unit: String,
        /// Requested level type.
        level_type: LevelType,
    },

    /// The request cannot be composed as given.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No SQL view has this name.
    #[error("no SQL view named '{0}'")]
    SqlViewNotFound(String),

    /// More than one SQL view has this name.
    #[error("{} SQL views named '{name}'", .candidates.len())]
    AmbiguousSqlView {
        /// Requested view name.
        name: String,
        /// Every matching view.
        candidates: Vec<SqlView>,
    },

    /// The server reported an error status in the response body.
    #[error("server reported {status}: {message}")]
    ServerStatus {
        /// Reported status.
        status: String,
        /// Reported message.
        message: String,
    },

    /// The response could not be normalized into a table.
    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
}

impl DatimError {
    /// Classifies the failure as soft (value absent) or hard (operation
    /// aborted).
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Network(_)
            | Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::JsonParse(_)
            | Self::DimensionNotFound(_)
            | Self::OrgUnitNotFound(_)
            | Self::OrgLevelNotFound { .. }
            | Self::SqlViewNotFound(_)
            | Self::AmbiguousSqlView { .. }
            | Self::ServerStatus { .. } => Severity::Soft,
            Self::Config(_)
            | Self::ItemListUnavailable { .. }
            | Self::ItemNotFound { .. }
            | Self::InvalidQuery(_)
            | Self::Normalize(_) => Severity::Hard,
        }
    }

    /// Returns whether the value is merely absent.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.severity() == Severity::Soft
    }

    /// Returns a short message suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Config(_) => "The client configuration is invalid.",
            Self::Network(_) | Self::Timeout { .. } => {
                "Could not reach the analytics server. Please check your connection."
            }
            Self::HttpStatus { status: 401 | 403, .. } => {
                "The server rejected the credentials."
            }
            Self::HttpStatus { .. } | Self::ServerStatus { .. } => {
                "The analytics server reported an error."
            }
            Self::JsonParse(_) => "The server response could not be read.",
            Self::DimensionNotFound(_) | Self::ItemListUnavailable { .. } | Self::ItemNotFound { .. } => {
                "A dimension or item name could not be resolved."
            }
            Self::OrgUnitNotFound(_) | Self::OrgLevelNotFound { .. } => {
                "The organisation unit is not known."
            }
            Self::InvalidQuery(_) => "The query is incomplete.",
            Self::SqlViewNotFound(_) | Self::AmbiguousSqlView { .. } => {
                "The SQL view name did not match exactly one view."
            }
            Self::Normalize(_) => "The analytics response could not be turned into a table.",
        }
    }

    /// Returns whether the failure came from the network layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

impl From<reqwest::Error> for DatimError {
    fn from(err: reqwest::Error) -> Self {
        match err.url() {
            Some(url) if err.is_timeout() => Self::Timeout {
                url: url.to_string(),
            },
            _ => Self::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DatimError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, DatimError>;
