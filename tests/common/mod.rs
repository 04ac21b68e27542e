//! Shared helpers: an app over `MemoryStore` and one-shot JSON requests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use cms_backend::{app, AppConfig, AppState, MemoryStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState { store: store.clone() };
    TestApp {
        router: app(state, &AppConfig::default()),
        store,
    }
}

pub async fn send_raw(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(text.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub async fn get_request(router: &Router, uri: &str) -> (StatusCode, Value) {
    send_raw(router, Method::GET, uri, None).await
}

pub async fn delete_request(router: &Router, uri: &str) -> (StatusCode, Value) {
    send_raw(router, Method::DELETE, uri, None).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_raw(router, Method::POST, uri, Some(&body.to_string())).await
}

pub async fn put_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_raw(router, Method::PUT, uri, Some(&body.to_string())).await
}

pub fn assert_error(body: &Value, code: u16, message: &str) {
    assert_eq!(body["code"].as_u64(), Some(code as u64), "body: {}", body);
    assert_eq!(body["message"].as_str(), Some(message), "body: {}", body);
}

/// Parse an RFC 3339 timestamp field from a response body.
pub fn timestamp(value: &Value) -> chrono::DateTime<chrono::Utc> {
    let raw = value.as_str().unwrap_or_else(|| panic!("not a timestamp: {}", value));
    chrono::DateTime::parse_from_rfc3339(raw)
        .unwrap_or_else(|e| panic!("bad timestamp {:?}: {}", raw, e))
        .with_timezone(&chrono::Utc)
}
