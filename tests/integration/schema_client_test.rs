use super::common;

use airborne_schema::adapters::{ClientError, HttpSchemaStore};
use airborne_schema::builder::{SchemaBuilderSession, SessionError};
use airborne_schema::domain::{FieldDraft, FieldKind, FlatSchemaMap, SchemaNode, SchemaStore};
use common::test_server::{serve_truncated_body, RecordedRequest, TestServer};
use serde_json::json;

fn sample_properties() -> FlatSchemaMap {
    let mut properties = FlatSchemaMap::new();
    properties.insert(
        "checkout.retries".to_string(),
        SchemaNode::new(json!({"type": "number", "minimum": 1, "maximum": 5}))
            .with_default(json!(3))
            .with_description("Checkout retries"),
    );
    properties.insert(
        "theme".to_string(),
        SchemaNode::new(json!({"type": "string", "enum": ["light", "dark"]})),
    );
    properties
}

#[tokio::test]
async fn test_fetch_sends_headers() {
    let server = TestServer::with_properties(sample_properties()).await;
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    let properties = store.fetch_properties().await.unwrap();
    assert_eq!(properties, sample_properties());

    assert_eq!(
        server.requests(),
        vec![RecordedRequest {
            method: "GET",
            authorization: Some("Bearer test-token".to_string()),
            organisation: Some("acme".to_string()),
            application: Some("shop".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_request_without_token() {
    let server = TestServer::new().await;
    let mut api = server.settings().api;
    api.token = None;
    let store = HttpSchemaStore::new(&api).unwrap();

    assert!(store.fetch_properties().await.unwrap().is_empty());
    assert_eq!(server.requests()[0].authorization, None);
}

#[tokio::test]
async fn test_save_replaces_backend_properties() {
    let server = TestServer::new().await;
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    let saved = store.save_properties(&sample_properties()).await.unwrap();
    assert_eq!(saved, sample_properties());
    assert_eq!(server.properties(), sample_properties());
    assert_eq!(server.requests()[0].method, "PUT");
}

#[tokio::test]
async fn test_empty_save_response_returns_input() {
    let server = TestServer::new().await;
    server.state.lock().unwrap().empty_put_response = true;
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    let saved = store.save_properties(&sample_properties()).await.unwrap();
    assert_eq!(saved, sample_properties());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = TestServer::new().await;
    server.fail_with(403);
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    match store.fetch_properties().await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "backend failure");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend() {
    let server = TestServer::new().await;
    let mut api = server.settings().api;
    // Nothing listens on port 9 (discard) on the test host
    api.base_url = "http://127.0.0.1:9".to_string();
    let store = HttpSchemaStore::new(&api).unwrap();

    assert!(matches!(
        store.fetch_properties().await,
        Err(ClientError::Http(_)) | Err(ClientError::Timeout)
    ));
}

#[tokio::test]
async fn test_truncated_body_is_an_error() {
    let server = TestServer::new().await;
    let mut api = server.settings().api;
    api.base_url = serve_truncated_body().await;
    let store = HttpSchemaStore::new(&api).unwrap();

    let fetched = store.fetch_properties().await;
    assert!(matches!(fetched, Err(ClientError::Http(_))), "{:?}", fetched);

    let saved = store.save_properties(&sample_properties()).await;
    assert!(matches!(saved, Err(ClientError::Http(_))), "{:?}", saved);
}

#[tokio::test]
async fn test_session_edit_and_save() {
    let server = TestServer::with_properties(sample_properties()).await;
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    let mut session = SchemaBuilderSession::load(&store).await.unwrap();
    assert_eq!(session.tree().len(), 3);

    let checkout = session.tree().find_by_path("checkout").unwrap().clone();
    session
        .tree_mut()
        .add_field(
            Some(&checkout),
            FieldDraft::new("expressPay", FieldKind::Boolean).required(true),
        )
        .unwrap();
    assert!(session.has_changes());

    let export = session.save(&store).await.unwrap();
    assert!(export.warnings.is_empty());
    assert!(!session.has_changes());

    let stored = server.properties();
    assert_eq!(stored.len(), 3);
    let express = &stored["checkout.expressPay"];
    assert_eq!(express.default_value, json!(false));
    assert_eq!(express.description, "Express Pay");
    assert_eq!(stored["checkout.retries"].default_value, json!(3));
    assert_eq!(stored["checkout.retries"].description, "Checkout retries");
    assert_eq!(stored["theme"].default_value, json!("light"));
}

#[tokio::test]
async fn test_session_load_failure() {
    let server = TestServer::new().await;
    server.fail_with(500);
    let store = HttpSchemaStore::new(&server.settings().api).unwrap();

    assert!(matches!(
        SchemaBuilderSession::load(&store).await,
        Err(SessionError::Client(ClientError::Status { status: 500, .. }))
    ));
    let session = SchemaBuilderSession::load_or_empty(&store).await;
    assert!(session.tree().is_empty());
}
