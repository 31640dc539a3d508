//! In-memory DATIM server for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use datim_client::{DatimClient, DatimError, Result, StaticOrgUnits, Transport};
use datim_model::{DisplayProperty, LevelType};
use serde_json::{Value, json};

pub const BASE_URL: &str = "https://datim.test/api";

pub const TARGETS_RESULTS_ID: &str = "IeMmjHyBUpi";
pub const TECHNICAL_AREA_ID: &str = "LxhLO68FcXm";
pub const DISAGGREGATION_TYPE_ID: &str = "HWPJnUTMjEq";
pub const FUNDING_AGENCY_ID: &str = "FPUgmtt8HRi";

pub const NIGERIA_UID: &str = "PqlFzhuPcF1";

/// Canned responses keyed by full URL, with a log of every request.
#[derive(Default)]
pub struct FakeServer {
    responses: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `{BASE_URL}/{path}`.
    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(format!("{BASE_URL}/{path}"), body.to_string());
        self
    }

    pub fn with_raw(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(format!("{BASE_URL}/{path}"), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, fragment: &str) -> bool {
        self.requests().iter().any(|url| url.contains(fragment))
    }
}

impl Transport for FakeServer {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| DatimError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn items(entries: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = entries
        .iter()
        .map(|(id, name)| json!({"id": id, "displayName": name}))
        .collect();
    json!({ "items": items })
}

/// A server with the four dimensions the composer needs.
pub fn catalog_server() -> FakeServer {
    FakeServer::new()
        .with(
            "dimensions?paging=false",
            json!({"dimensions": [
                {"id": TECHNICAL_AREA_ID, "displayName": "Technical Area"},
                {"id": TARGETS_RESULTS_ID, "displayName": "Targets / Results"},
                {"id": DISAGGREGATION_TYPE_ID, "displayName": "Disaggregation Type"},
                {"id": FUNDING_AGENCY_ID, "name": "Funding Agency"}
            ]}),
        )
        .with(
            &format!("dimensions/{TARGETS_RESULTS_ID}/items?paging=false"),
            items(&[("Jh0jDM5yQ2E", "Targets"), ("W8imnja2Owd", "Results")]),
        )
        .with(
            &format!("dimensions/{TECHNICAL_AREA_ID}/items?paging=false"),
            items(&[("ta_plhiv", "PLHIV"), ("ta_hts", "HTS_TST"), ("ta_tx", "TX_CURR")]),
        )
        .with(
            &format!("dimensions/{DISAGGREGATION_TYPE_ID}/items?paging=false"),
            items(&[("dt_age", "Age/Sex"), ("dt_kp", "KeyPop")]),
        )
        .with(
            &format!("dimensions/{FUNDING_AGENCY_ID}/items?paging=false"),
            items(&[("fa_usaid", "USAID"), ("fa_cdc", "CDC")]),
        )
}

pub fn nigeria() -> StaticOrgUnits {
    StaticOrgUnits::new()
        .with_unit("Nigeria", NIGERIA_UID)
        .with_level("Nigeria", LevelType::Country, 3)
        .with_level("Nigeria", LevelType::Prioritization, 4)
}

/// A client over `server`, keeping a handle for request assertions.
pub fn client(server: FakeServer) -> (DatimClient, Arc<FakeServer>) {
    let server = Arc::new(server);
    let client = DatimClient::with_transport(
        BASE_URL,
        DisplayProperty::default(),
        Box::new(Arc::clone(&server)),
    );
    (client, server)
}
