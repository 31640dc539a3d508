//! SQL view resolver integration tests.

mod common;

use common::{FakeServer, client};
use datim_client::DatimError;
use datim_model::{SqlViewParamKind, SqlViewParams};
use serde_json::json;

fn views_server() -> FakeServer {
    FakeServer::new().with(
        "sqlViews?format=json&paging=false",
        json!({"sqlViews": [
            {"id": "vMech1", "displayName": "Mechanisms"},
            {"id": "vMech2", "displayName": "Mechanisms"},
            {"id": "vPartners", "displayName": "Partners"},
            {"id": "vSites", "name": "Sites by OU"}
        ]}),
    )
}

#[test]
fn test_single_match_yields_uid() {
    let (client, server) = client(views_server());
    assert_eq!(client.sql_views().sql_view_id("Partners").unwrap(), "vPartners");
    assert_eq!(client.sql_views().sql_view_id("Sites by OU").unwrap(), "vSites");
    assert!(!server.requested("/data"));
}

#[test]
fn test_no_match_is_soft() {
    let (client, _) = client(views_server());
    let err = client.sql_views().sql_view_id("partners").unwrap_err();

    assert!(matches!(err, DatimError::SqlViewNotFound(ref name) if name == "partners"));
    assert!(err.is_soft());
}

#[test]
fn test_ambiguous_dataset_request_fetches_nothing() {
    let (client, server) = client(views_server());
    let err = client
        .sql_views()
        .fetch_dataset("Mechanisms", None)
        .unwrap_err();

    match err {
        DatimError::AmbiguousSqlView { name, candidates } => {
            assert_eq!(name, "Mechanisms");
            let uids: Vec<&str> = candidates.iter().map(|view| view.uid.as_str()).collect();
            assert_eq!(uids, ["vMech1", "vMech2"]);
        }
        other => panic!("expected an ambiguous view, got {other:?}"),
    }
    assert!(!server.requested("/data"));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_ambiguous_lookup_without_dataset_is_soft() {
    let (client, _) = client(views_server());
    let err = client.sql_views().sql_view_id("Mechanisms").unwrap_err();
    assert!(matches!(err, DatimError::AmbiguousSqlView { .. }));
    assert!(err.is_soft());
}

#[test]
fn test_field_params_become_filters() {
    let (client, _) = client(views_server());
    let params = SqlViewParams::fields([("OU", "NG")]);

    let url = client.sql_views().dataset_url("vSites", Some(&params));
    assert_eq!(
        url,
        "https://datim.test/api/sqlViews/vSites/data?format=json&paging=false&fields=*&filter=OU:eq:NG"
    );
}

#[test]
fn test_reserved_characters_stay_inside_the_filter() {
    let (client, _) = client(views_server());
    let params = SqlViewParams::fields([("OU", "A&B")]);

    let url = client.sql_views().dataset_url("vSites", Some(&params));
    assert!(url.ends_with("&fields=*&filter=OU:eq:A%26B"));
}

#[test]
fn test_variable_params_and_unknown_kind() {
    let (client, _) = client(views_server());
    let resolver = client.sql_views();

    let params = SqlViewParams::variables([("year", "2024"), ("ou", "NG")]);
    assert!(resolver
        .dataset_url("vSites", Some(&params))
        .ends_with("&fields=*&var=year:2024&var=ou:NG"));

    let params = SqlViewParams::new(SqlViewParamKind::from("criteria"), [("OU", "NG")]);
    assert!(resolver
        .dataset_url("vSites", Some(&params))
        .ends_with("&fields=*"));
}

#[test]
fn test_fetch_dataset_builds_table() {
    let server = views_server().with(
        "sqlViews/vSites/data?format=json&paging=false&fields=*&filter=OU:eq:NG",
        json!({"listGrid": {
            "headers": [{"name": "ou", "column": "ou"}, {"name": "site", "column": "site"}],
            "rows": [["NG", "Ikeja General"], ["NG", null]]
        }}),
    );
    let (client, _) = client(server);

    let frame = client
        .sql_views()
        .fetch_dataset("Sites by OU", Some(&SqlViewParams::fields([("OU", "NG")])))
        .unwrap();

    assert_eq!(frame.shape(), (2, 2));
    assert_eq!(frame.column("site").unwrap().null_count(), 1);
}

#[test]
fn test_server_status_aborts() {
    let server = views_server().with(
        "sqlViews/vPartners/data?format=json&paging=false&fields=*",
        json!({"status": "ERROR", "message": "View is not materialised"}),
    );
    let (client, _) = client(server);

    let err = client.sql_views().fetch_dataset("Partners", None).unwrap_err();
    assert!(matches!(err, DatimError::ServerStatus { ref status, .. } if status == "ERROR"));
    assert!(err.is_soft());
}
