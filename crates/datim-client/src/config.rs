//! Client configuration.
//!
//! A [`DatimConfig`] is passed explicitly to every client; there is no
//! process-wide default account. Configuration is usually read from a TOML
//! file and then overridden from the environment:
//!
//! ```toml
//! base_url = "https://www.datim.org/api"
//! timeout_secs = 120
//!
//! [credentials]
//! username = "analyst"
//! password = "secret"
//!
//! [org_units.Nigeria]
//! uid = "PqlFzhuPcF1"
//! levels = { country = 3, prioritization = 4 }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use datim_model::DisplayProperty;
use serde::{Deserialize, Serialize};

use crate::error::{DatimError, Result};
use crate::orgunit::OrgUnitEntry;

/// Environment variable overriding [`DatimConfig::base_url`].
pub const ENV_BASE_URL: &str = "DATIM_BASE_URL";
/// Environment variable overriding the username.
pub const ENV_USERNAME: &str = "DATIM_USERNAME";
/// Environment variable overriding the password.
pub const ENV_PASSWORD: &str = "DATIM_PASSWORD";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// HTTP basic auth credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Connection and request settings for one analytics server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatimConfig {
    /// API root, e.g. `https://www.datim.org/api`.
    pub base_url: String,

    #[serde(default)]
    pub credentials: Credentials,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default `displayProperty` for composed queries.
    #[serde(default)]
    pub display_property: DisplayProperty,

    /// Known org units, keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub org_units: BTreeMap<String, OrgUnitEntry>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl DatimConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            display_property: DisplayProperty::default(),
            org_units: BTreeMap::new(),
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| DatimError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            DatimError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Applies `DATIM_BASE_URL`, `DATIM_USERNAME` and `DATIM_PASSWORD` from
    /// the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup (empty values are ignored).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.credentials.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.credentials.password = password;
        }
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Checks that the configuration can be used to build a client.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(DatimError::Config("base_url is empty".to_string()));
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(DatimError::Config(format!(
                "base_url must start with http:// or https://, got '{base_url}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DatimError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
