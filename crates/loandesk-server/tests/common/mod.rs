//! Common utilities for loandesk server integration tests
//!
//! Tests drive the full router (routes, fallbacks, request boundary) with
//! `tower::ServiceExt::oneshot` against an in-memory store, so no database is
//! needed.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use loandesk_server::{
    api,
    store::{Execution, Lookup, MemoryStore, Mutation, Row, Store, StoreError},
};
use serde_json::Value;
use tower::ServiceExt;

/// Router plus the store behind it
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self {
            router: api::app(Arc::clone(&store)),
            store,
        }
    }

    /// Send a request and decode the JSON response body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        self.dispatch(request).await
    }

    pub async fn send_form(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(&body.to_string())).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, first_name: &str, last_name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/users",
                serde_json::json!({"first_name": first_name, "last_name": last_name}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["row_id"].as_i64().unwrap()
    }

    /// Create a loan and return its id.
    pub async fn create_loan(&self, user_id: i64, amount: i64, create_time: i64) -> i64 {
        let (status, body) = self
            .post(
                "/loans",
                serde_json::json!({
                    "user_id": user_id,
                    "amount": amount,
                    "create_time": create_time,
                    "pay_time": create_time + 86_400
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["row_id"].as_i64().unwrap()
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

/// Store whose every call fails with the given error
pub struct FailingStore {
    pub error: StoreError,
}

impl FailingStore {
    pub fn new(error: StoreError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn execute(&self, _mutation: &Mutation) -> Result<Execution, StoreError> {
        Err(self.error.clone())
    }

    async fn fetch(&self, _lookup: Lookup) -> Result<Vec<Row>, StoreError> {
        Err(self.error.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(self.error.clone())
    }
}
