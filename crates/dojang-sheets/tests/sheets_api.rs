//! GoogleSheetStore against a mock Sheets v4 API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use dojang_core::{Record, Revision, Table};
use dojang_gcp_auth::{AuthError, StaticTokenProvider, TokenProvider};
use dojang_sheets::GoogleSheetStore;
use dojang_store::{append_record, ReadFailurePolicy, ReadOutcome, SheetStore, StoreError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALUES_PATH: &str = "/v4/spreadsheets/sheet-id/values/'Sheet1'";

fn store(server: &MockServer) -> GoogleSheetStore {
    GoogleSheetStore::new("sheet-id", Arc::new(StaticTokenProvider::new("test-token")))
        .with_base_url(format!("{}/v4/spreadsheets", server.uri()))
}

fn values(grid: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "range": "Sheet1!A1:Z1000",
        "majorDimension": "ROWS",
        "values": grid,
    }))
}

fn missing_range() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": {
            "code": 400,
            "message": "Unable to parse range: Sheet1",
            "status": "INVALID_ARGUMENT",
        }
    }))
}

fn record(name: &str) -> Record {
    let mut r = Record::new();
    r.push("Name (姓名)", name);
    r.push("Match_Control (比賽掌控)", "3");
    r
}

#[tokio::test]
async fn test_read_existing_worksheet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .and(query_param("valueRenderOption", "UNFORMATTED_VALUE"))
        .and(query_param("dateTimeRenderOption", "FORMATTED_STRING"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(values(json!([
            ["Name (姓名)", "Match_Control (比賽掌控)"],
            ["Lee", 4.5],
            ["Chen"],
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let table = store(&server).read().await.unwrap().into_table();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "Match_Control (比賽掌控)"), Some("4.5"));
    assert_eq!(table.cell(1, "Match_Control (比賽掌控)"), Some(""));
}

#[tokio::test]
async fn test_empty_worksheet_reads_as_empty_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:Z1000",
            "majorDimension": "ROWS",
        })))
        .mount(&server)
        .await;

    match store(&server).read().await.unwrap() {
        ReadOutcome::Found(snapshot) => assert!(snapshot.table.is_empty()),
        ReadOutcome::Missing => unreachable!("worksheet exists"),
    }
}

#[tokio::test]
async fn test_unknown_worksheet_reads_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(missing_range())
        .mount(&server)
        .await;

    assert_eq!(store(&server).read().await.unwrap(), ReadOutcome::Missing);
}

#[tokio::test]
async fn test_forbidden_is_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED",
            }
        })))
        .mount(&server)
        .await;

    let err = store(&server).read().await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    assert!(err.to_string().contains("The caller does not have permission"));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend error"))
        .mount(&server)
        .await;

    let err = store(&server).read().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[tokio::test]
async fn test_append_to_missing_worksheet_adds_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(missing_range())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id:batchUpdate"))
        .and(body_partial_json(json!({
            "requests": [{ "addSheet": { "properties": { "title": "Sheet1" } } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(VALUES_PATH))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_partial_json(json!({
            "values": [["Name (姓名)", "Match_Control (比賽掌控)"], ["Lee", 3]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let report = append_record(&store(&server), &record("Lee"), ReadFailurePolicy::Strict)
        .await
        .unwrap();
    assert!(report.bootstrapped);
    assert_eq!(report.rows_after, 1);
}

#[tokio::test]
async fn test_append_keeps_existing_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(values(json!([
            ["Name (姓名)", "Match_Control (比賽掌控)"],
            ["Chen", "5"],
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(VALUES_PATH))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_partial_json(json!({
            "values": [
                ["Name (姓名)", "Match_Control (比賽掌控)"],
                ["Chen", 5],
                ["Lee", 3],
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let report = append_record(&store(&server), &record("Lee"), ReadFailurePolicy::Strict)
        .await
        .unwrap();
    assert_eq!((report.rows_before, report.rows_after), (1, 2));
}

#[tokio::test]
async fn test_concurrent_change_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(values(json!([["Name (姓名)"], ["Chen"]])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(values(json!([["Name (姓名)"], ["Chen"], ["Wang"]])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let err = append_record(&store(&server), &record("Lee"), ReadFailurePolicy::Strict)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_shrinking_replace_clears_leftover_rows() {
    let server = MockServer::start().await;
    let current = Table::from_grid(vec![
        vec!["Name".to_string()],
        vec!["A".to_string()],
        vec!["B".to_string()],
        vec!["C".to_string()],
    ]);
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(values(json!([["Name"], ["A"], ["B"], ["C"]])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id/values:batchClear"))
        .and(body_partial_json(json!({ "ranges": ["'Sheet1'!3:4"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let smaller = Table::from_grid(vec![vec!["Name".to_string()], vec!["A".to_string()]]);
    let revision = store(&server)
        .replace(&smaller, &current.revision())
        .await
        .unwrap();
    assert_eq!(revision, smaller.revision());
}

struct NoCredentials;

#[async_trait]
impl TokenProvider for NoCredentials {
    async fn access_token(&self) -> Result<String, AuthError> {
        Err(AuthError::MissingCredentials)
    }
}

#[tokio::test]
async fn test_token_failure_is_auth_error() {
    let server = MockServer::start().await;
    let store = GoogleSheetStore::new("sheet-id", Arc::new(NoCredentials))
        .with_base_url(format!("{}/v4/spreadsheets", server.uri()));
    let err = store.read().await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)));

    let err = store
        .replace(&Table::new(), &Revision::Absent)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)));
}

#[tokio::test]
async fn test_cell_reference_title_is_quoted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id/values/'Q1'"))
        .respond_with(values(json!([["Name"], ["Lee"]])))
        .expect(1)
        .mount(&server)
        .await;

    let table = store(&server)
        .with_worksheet("Q1")
        .read()
        .await
        .unwrap()
        .into_table();
    assert_eq!(table.cell(0, "Name"), Some("Lee"));
}

struct DeniedCredentials;

#[async_trait]
impl TokenProvider for DeniedCredentials {
    async fn access_token(&self) -> Result<String, AuthError> {
        Err(AuthError::Rejected {
            status: 403,
            message: "service account disabled".to_string(),
        })
    }
}

#[tokio::test]
async fn test_denied_token_is_permission_denied() {
    let server = MockServer::start().await;
    let store = GoogleSheetStore::new("sheet-id", Arc::new(DeniedCredentials))
        .with_base_url(format!("{}/v4/spreadsheets", server.uri()));
    let err = store.read().await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    assert!(err.to_string().contains("service account disabled"));
}
