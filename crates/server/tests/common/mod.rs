//! Shared harness for API integration tests.
//!
//! Builds the full router over a [`MemoryRemoteStore`] so tests exercise
//! the real handlers, coordinator, and container without a network.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use comanda_server::routes;
use comanda_server::seed::SeedData;
use comanda_server::state::AppState;
use comanda_server::store::MemoryRemoteStore;

/// Build the application router over `store` with the default seeds.
pub fn test_app(store: &MemoryRemoteStore) -> Router {
    let state = AppState::new(Arc::new(store.clone()), SeedData::default());
    routes::routes().with_state(state)
}

/// Send a request and return `(status, parsed JSON body)`.
///
/// Empty bodies (204 responses) come back as `Value::Null`.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is not JSON")
    };
    (status, body)
}

/// Build a GET request.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request build")
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request build")
}

/// Let background sync tasks spawned by a handler run to completion.
///
/// Tests run on the current-thread runtime, so a few yields drain every
/// ready task deterministically.
pub async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}
