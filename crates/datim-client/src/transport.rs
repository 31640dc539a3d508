//! HTTP transport.
//!
//! Everything above this module talks to the server through [`Transport`],
//! so tests can serve canned bodies without a network.

use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::{Credentials, DatimConfig};
use crate::error::{DatimError, Result};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("datim-client/", env!("CARGO_PKG_VERSION"));

/// Issues authenticated GET requests and returns the response body.
pub trait Transport: Send + Sync {
    /// Fetches `url`. Non-success statuses are errors.
    fn get(&self, url: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

/// Blocking `reqwest` transport with basic auth and a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
}

impl HttpTransport {
    /// Builds a transport from the configured timeout and credentials.
    pub fn new(config: &DatimConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| DatimError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatimError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}
