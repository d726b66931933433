//! Server-level integration tests
//!
//! These tests verify:
//! - Index and health endpoints
//! - Unknown routes and unsupported methods produce envelopes
//! - Undecodable path ids and oversized bodies produce envelopes
//! - Store failures are classified or hidden behind a 500

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use loandesk_server::store::StoreError;
use serde_json::json;

mod common;
use common::{FailingStore, TestApp};

#[tokio::test]
async fn test_index() {
    let app = TestApp::new();
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": true, "message": "it works!"}));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": true, "message": "healthy"}));

    let down = TestApp::with_store(Arc::new(FailingStore::new(StoreError::uncoded("refused"))));
    let (status, body) = down.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let (status, body) = app.get("/accounts/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": false, "message": "Not found.", "code": 404})
    );
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::PATCH, "/users/1"),
        (Method::DELETE, "/users"),
        (Method::PUT, "/loans"),
        (Method::POST, "/loans/1"),
    ] {
        let (status, body) = app.send(method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(
            body,
            json!({"status": false, "message": "Method not allowed.", "code": 405})
        );
    }
}

#[tokio::test]
async fn test_unclassified_store_failure_is_hidden() {
    let store = FailingStore::new(StoreError::new(
        "53300",
        "sorry, too many clients already",
    ));
    let app = TestApp::with_store(Arc::new(store));

    let (status, body) = app
        .post("/users", json!({"first_name": "Ada", "last_name": "Lovelace"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"status": false, "message": "Internal error was raised"})
    );

    let (status, body) = app.get("/loans").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal error was raised");
}

#[tokio::test]
async fn test_mysql_codes_are_classified() {
    let app = TestApp::with_store(Arc::new(FailingStore::new(StoreError::new(
        "1451",
        "Cannot delete or update a parent row",
    ))));
    let (status, body) = app.delete("/users/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Impossible to delete a user because the user has loans"
    );

    let app = TestApp::with_store(Arc::new(FailingStore::new(StoreError::new(
        "1292",
        "Incorrect date value",
    ))));
    let (status, body) = app.put("/users/1", json!({"birth_date": "soon"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect date format!");
}

#[tokio::test]
async fn test_validation_happens_before_the_store() {
    // A failing store is never reached when the payload is invalid
    let app = TestApp::with_store(Arc::new(FailingStore::new(StoreError::uncoded("down"))));
    let (status, body) = app.post("/loans", json!({"amount": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Param \"user_id\" is required!");
}

#[tokio::test]
async fn test_undecodable_path_id_gets_an_envelope() {
    let app = TestApp::new();

    for (method, uri, body) in [
        (Method::PUT, "/users/%FF", Some("{}")),
        (Method::GET, "/users/%FF", None),
        (Method::DELETE, "/loans/%C3%28", None),
    ] {
        let (status, body) = app.send(method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(
            body,
            json!({"status": false, "message": "Bad Request", "code": 400}),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_oversized_body_gets_an_envelope() {
    let app = TestApp::new();
    let padding = "x".repeat(3 * 1024 * 1024);
    let raw = json!({"first_name": "Ada", "last_name": padding}).to_string();

    for (method, uri) in [(Method::POST, "/users"), (Method::PUT, "/loans/1")] {
        let (status, body) = app.send(method.clone(), uri, Some(&raw)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{method} {uri}");
        assert_eq!(
            body,
            json!({"status": false, "message": "Payload Too Large", "code": 413}),
            "{method} {uri}"
        );
    }

    let (_, body) = app.get("/users").await;
    assert_eq!(body["status"], false);
}
