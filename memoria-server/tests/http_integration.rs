//! HTTP integration tests for the Memoria fact API
//!
//! Requests go through the full router with `oneshot`, backed by the
//! in-memory store, so no database is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use memoria_core::{Fact, FactStore, InMemoryFactStore, MemoriaError, MemoriaResult, StoreHandle};
use memoria_server::http::{build_router, HttpState};
use serde_json::{json, Value};
use tower::ServiceExt;

const FACTS: &str = "/api/fact/facts/";

fn make_app() -> Router {
    make_app_with(Arc::new(InMemoryFactStore::new()))
}

fn make_app_with(store: StoreHandle) -> Router {
    build_router(Arc::new(HttpState { store }))
}

fn fact_rq(question: &str, answer: &str) -> Value {
    json!({"owner": "temple", "labels": ["multiplication"], "question": question, "answer": answer})
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, question: &str, answer: &str) -> Value {
    let (status, body) = send_json(app, "POST", FACTS, Some(fact_rq(question, answer))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {:?}", body);
    body
}

async fn create_three(app: &Router) -> Value {
    create(app, "1 x 2", "2").await;
    let target = create(app, "2 x 2", "4").await;
    create(app, "2 x 3", "6").await;
    target
}

// ===========================================================================
// Collection: POST
// ===========================================================================

#[tokio::test]
async fn test_add_fact() {
    let app = make_app();
    let (status, fact) = send_json(&app, "POST", FACTS, Some(fact_rq("2 x 2", "4"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(fact["uuid"].is_string());
    assert!(fact["created_at"].is_string());
    assert!(fact["modified_at"].is_string());
    assert_eq!(fact["owner"], "temple");
    assert_eq!(fact["labels"], json!(["multiplication"]));
    assert_eq!(fact["question"], "2 x 2");
    assert_eq!(fact["answer"], "4");

    for key in ["created_at", "modified_at"] {
        let raw = fact[key].as_str().unwrap();
        assert!(
            chrono::DateTime::parse_from_rfc3339(raw).is_ok(),
            "{} must be ISO 8601, got {}",
            key,
            raw
        );
    }
}

#[tokio::test]
async fn test_add_fact_ignores_client_uuid_and_timestamps() {
    let app = make_app();
    let mut body = fact_rq("2 x 2", "4");
    body["uuid"] = json!("client-chosen");
    body["created_at"] = json!("1999-01-01T00:00:00Z");

    let (status, fact) = send_json(&app, "POST", FACTS, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(fact["uuid"], "client-chosen");
    assert_ne!(fact["created_at"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_add_fact_without_labels() {
    let app = make_app();
    let body = json!({"owner": "temple", "question": "3 x 3", "answer": "9"});
    let (status, fact) = send_json(&app, "POST", FACTS, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fact["labels"], json!([]));
}

#[tokio::test]
async fn test_add_fact_missing_field_is_400() {
    let app = make_app();
    let body = json!({"owner": "temple", "question": "3 x 3"});
    let (status, err) = send_json(&app, "POST", FACTS, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Input payload validation failed");
    assert!(err["errors"]["payload"].is_string());
}

#[tokio::test]
async fn test_add_fact_malformed_json_is_400() {
    let app = make_app();
    let req = Request::builder()
        .method("POST")
        .uri(FACTS)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ===========================================================================
// Collection: GET
// ===========================================================================

#[tokio::test]
async fn test_list_facts() {
    let app = make_app();
    create_three(&app).await;

    let (status, facts) = send_json(&app, "GET", "/api/fact/facts/?page=1&per_page=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(facts["page"], 1);
    assert_eq!(facts["pages"], 1);
    assert_eq!(facts["per_page"], 10);
    assert_eq!(facts["total"], 3);
    assert_eq!(facts["items"].as_array().unwrap().len(), 3);

    let questions: Vec<&str> = facts["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["question"].as_str().unwrap())
        .collect();
    assert_eq!(questions, vec!["1 x 2", "2 x 2", "2 x 3"]);
}

#[tokio::test]
async fn test_list_defaults_and_no_trailing_slash() {
    let app = make_app();
    create_three(&app).await;

    let (status, facts) = send_json(&app, "GET", "/api/fact/facts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(facts["page"], 1);
    assert_eq!(facts["per_page"], 10);
    assert_eq!(facts["total"], 3);
}

#[tokio::test]
async fn test_list_page_beyond_last_is_empty() {
    let app = make_app();
    create_three(&app).await;

    let (status, facts) = send_json(&app, "GET", "/api/fact/facts/?page=5&per_page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(facts["page"], 5);
    assert_eq!(facts["pages"], 3);
    assert_eq!(facts["total"], 3);
    assert_eq!(facts["items"], json!([]));
}

#[tokio::test]
async fn test_list_rejects_per_page_outside_choices() {
    let app = make_app();
    let (status, err) = send_json(&app, "GET", "/api/fact/facts/?per_page=5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["errors"]["per_page"].is_string());
}

#[tokio::test]
async fn test_list_rejects_non_integer_page() {
    let app = make_app();
    let (status, err) = send_json(&app, "GET", "/api/fact/facts/?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["errors"]["page"].is_string());
}

// ===========================================================================
// Item: GET / PUT / DELETE
// ===========================================================================

#[tokio::test]
async fn test_get_fact() {
    let app = make_app();
    let target = create_three(&app).await;
    let uuid = target["uuid"].as_str().unwrap();

    let (status, fact) = send_json(&app, "GET", &format!("{}{}", FACTS, uuid), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fact, target, "Fetched fact must equal the created one");
}

#[tokio::test]
async fn test_get_missing_fact_is_404() {
    let app = make_app();
    let (status, body) = send_json(&app, "GET", "/api/fact/facts/non-existent-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"message": "The fact 'non-existent-uuid' could not be found."})
    );
}

#[tokio::test]
async fn test_update_fact() {
    let app = make_app();
    let mut target = create_three(&app).await;
    let uuid = target["uuid"].as_str().unwrap().to_string();

    target["labels"] = json!(["multiplication", "maths"]);
    target["question"] = json!("6 x 6");
    target["answer"] = json!("36");

    let (status, body) = send(&app, "PUT", &format!("{}{}", FACTS, uuid), Some(target.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty(), "204 must have an empty body");

    let (_, updated) = send_json(&app, "GET", &format!("{}{}", FACTS, uuid), None).await;
    assert_eq!(updated["uuid"], uuid.as_str());
    assert_eq!(updated["created_at"], target["created_at"]);
    assert_eq!(updated["owner"], "temple");
    assert_eq!(updated["labels"], json!(["multiplication", "maths"]));
    assert_eq!(updated["question"], "6 x 6");
    assert_eq!(updated["answer"], "36");

    let created_at = chrono::DateTime::parse_from_rfc3339(updated["created_at"].as_str().unwrap()).unwrap();
    let modified_at = chrono::DateTime::parse_from_rfc3339(updated["modified_at"].as_str().unwrap()).unwrap();
    assert!(created_at <= modified_at);
}

#[tokio::test]
async fn test_update_missing_fact_is_404() {
    let app = make_app();
    create_three(&app).await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/fact/facts/non-existent-uuid",
        Some(fact_rq("6 x 6", "36")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"message": "The fact 'non-existent-uuid' could not be found. Unable to update fact."})
    );

    // No side effect
    let (_, facts) = send_json(&app, "GET", FACTS, None).await;
    assert_eq!(facts["total"], 3);
}

#[tokio::test]
async fn test_delete_fact() {
    let app = make_app();
    let target = create_three(&app).await;
    let uri = format!("{}{}", FACTS, target["uuid"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (_, facts) = send_json(&app, "GET", "/api/fact/facts/?page=1&per_page=10", None).await;
    assert_eq!(facts["total"], 2);
    assert_eq!(facts["items"].as_array().unwrap().len(), 2);

    let (status, _) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_fact_is_404() {
    let app = make_app();
    let (status, body) = send_json(&app, "DELETE", "/api/fact/facts/non-existent-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"message": "The fact 'non-existent-uuid' could not be found. Unable to delete fact."})
    );
}

// ===========================================================================
// Ambient endpoints and failure paths
// ===========================================================================

#[tokio::test]
async fn test_health_is_plain_ok() {
    let app = make_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = make_app();
    let (status, body) = send_json(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_swagger_document_lists_fact_paths() {
    let app = make_app();
    let (status, body) = send_json(&app, "GET", "/api/swagger.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Memoria Fact api");
    assert_eq!(body["info"]["description"], "Manages a set of Fact resources.");

    let paths = body["paths"].as_object().expect("paths object");
    assert!(paths.contains_key("/api/fact/facts/"));
    assert!(paths.contains_key("/api/fact/facts/{uuid}"));
    assert!(body["components"]["schemas"]["Fact"]["properties"]["question"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_404_json() {
    let app = make_app();
    let (status, body) = send_json(&app, "GET", "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

/// Store whose every call fails, standing in for a lost database connection.
struct BrokenStore;

#[async_trait]
impl FactStore for BrokenStore {
    async fn find_by_uuid(&self, _uuid: &str) -> MemoriaResult<Option<Fact>> {
        Err(MemoriaError::Other("connection reset by peer".to_string()))
    }

    async fn save(&self, _fact: &Fact) -> MemoriaResult<()> {
        Err(MemoriaError::Other("connection reset by peer".to_string()))
    }

    async fn remove(&self, _uuid: &str) -> MemoriaResult<bool> {
        Err(MemoriaError::Other("connection reset by peer".to_string()))
    }

    async fn paginate(&self, _offset: u64, _limit: u64) -> MemoriaResult<(Vec<Fact>, u64)> {
        Err(MemoriaError::Other("connection reset by peer".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let app = make_app_with(Arc::new(BrokenStore));
    let expected = json!({"message": "An unhandled exception occurred."});

    let (status, body) = send_json(&app, "GET", FACTS, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, expected);

    let (status, body) = send_json(&app, "POST", FACTS, Some(fact_rq("2 x 2", "4"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, expected);

    let (status, body) = send_json(&app, "GET", "/api/fact/facts/some-uuid", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, expected);
}

/// Store that panics, to exercise the catch-panic layer.
struct PanickingStore;

#[async_trait]
impl FactStore for PanickingStore {
    async fn find_by_uuid(&self, _uuid: &str) -> MemoriaResult<Option<Fact>> {
        panic!("index corrupted")
    }

    async fn save(&self, _fact: &Fact) -> MemoriaResult<()> {
        panic!("index corrupted")
    }

    async fn remove(&self, _uuid: &str) -> MemoriaResult<bool> {
        panic!("index corrupted")
    }

    async fn paginate(&self, _offset: u64, _limit: u64) -> MemoriaResult<(Vec<Fact>, u64)> {
        panic!("index corrupted")
    }
}

#[tokio::test]
async fn test_handler_panic_is_generic_500() {
    let app = make_app_with(Arc::new(PanickingStore));
    let (status, body) = send_json(&app, "GET", "/api/fact/facts/some-uuid", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "An unhandled exception occurred."}));
}
