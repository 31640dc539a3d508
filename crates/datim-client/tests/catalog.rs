//! Dimension catalog integration tests.

mod common;

use common::{
    FUNDING_AGENCY_ID, TARGETS_RESULTS_ID, TECHNICAL_AREA_ID, catalog_server, client,
};
use datim_client::DatimError;
use serde_json::json;

#[test]
fn test_list_dimensions_renames_display_field() {
    let (client, _) = client(catalog_server());
    let dimensions = client.catalog().list_dimensions().unwrap();

    assert_eq!(dimensions.len(), 4);
    assert_eq!(dimensions[0].name, "Technical Area");
    assert_eq!(dimensions[0].id, TECHNICAL_AREA_ID);
    // Falls back to `name` when `displayName` is absent.
    assert_eq!(dimensions[3].name, "Funding Agency");
}

#[test]
fn test_resolve_dimension_is_exact() {
    let (client, _) = client(catalog_server());
    let catalog = client.catalog();

    assert_eq!(
        catalog.resolve_dimension("Funding Agency").unwrap().id,
        FUNDING_AGENCY_ID
    );

    let err = catalog.resolve_dimension("funding agency").unwrap_err();
    assert!(matches!(err, DatimError::DimensionNotFound(ref name) if name == "funding agency"));
    assert!(err.is_soft());
}

#[test]
fn test_resolve_item_round_trip() {
    let (client, _) = client(catalog_server());
    let catalog = client.catalog();

    for name in ["PLHIV", "HTS_TST", "TX_CURR"] {
        let id = catalog.resolve_item("Technical Area", name).unwrap();
        assert_eq!(catalog.item_name("Technical Area", &id).unwrap(), name);
    }
}

#[test]
fn test_item_miss_is_hard() {
    let (client, _) = client(catalog_server());
    let err = client
        .catalog()
        .resolve_item("Technical Area", "VMMC_CIRC")
        .unwrap_err();

    assert!(!err.is_soft());
    assert_eq!(
        err.to_string(),
        "item 'VMMC_CIRC' not found in dimension 'Technical Area'"
    );
}

#[test]
fn test_items_of_unknown_dimension_are_unavailable() {
    let (client, server) = client(catalog_server());
    let err = client.catalog().list_items("Mechanism", None).unwrap_err();

    assert!(matches!(err, DatimError::ItemListUnavailable { ref dimension, .. } if dimension == "Mechanism"));
    assert!(!err.is_soft());
    assert!(!server.requested("/items"));
}

#[test]
fn test_empty_item_list_is_hard() {
    let server = catalog_server().with(
        &format!("dimensions/{FUNDING_AGENCY_ID}/items?paging=false"),
        json!({"items": []}),
    );
    let (client, _) = client(server);

    let err = client.catalog().list_items("Funding Agency", None).unwrap_err();
    assert!(matches!(err, DatimError::ItemListUnavailable { ref reason, .. } if reason == "empty item list"));
}

#[test]
fn test_items_with_fields_are_flattened() {
    let server = catalog_server().with(
        &format!("dimensions/{TARGETS_RESULTS_ID}/items?paging=false&fields=id%2CdisplayName%2CcategoryCombo%5Bid%5D"),
        json!({"items": [
            {"id": "Jh0jDM5yQ2E", "displayName": "Targets", "categoryCombo": {"id": "cc1"}}
        ]}),
    );
    let (client, server) = client(server);

    let items = client
        .catalog()
        .list_items("Targets / Results", Some("id,displayName,categoryCombo[id]"))
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Targets");
    assert_eq!(items[0].dimension_id, TARGETS_RESULTS_ID);
    assert_eq!(items[0].extra["categoryCombo.id"], "cc1");
    assert!(server.requested("&fields=id%2CdisplayName%2CcategoryCombo%5Bid%5D"));
}

#[test]
fn test_network_failure_on_dimensions_is_soft() {
    let (client, _) = client(common::FakeServer::new());
    let err = client.catalog().list_dimensions().unwrap_err();

    assert!(err.is_transport());
    assert!(err.is_soft());
}
