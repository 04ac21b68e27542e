//! Media endpoints.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_media_lifecycle() {
    let app = setup_test_app();

    let (status, created) = post_json(
        &app.router,
        "/api/v1/media",
        json!({"url": "http://x/a.jpg", "type": "image"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["url"], "http://x/a.jpg");
    assert_eq!(created["type"], "image");
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_string());

    let (status, fetched) = get_request(&app.router, "/api/v1/media/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["url"], "http://x/a.jpg");
    assert_eq!(fetched, created);

    let (status, body) = delete_request(&app.router, "/api/v1/media/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Media deleted successfully"}));

    let (status, body) = get_request(&app.router, "/api/v1/media/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"code": 404, "message": "Media not found"}));
}

#[tokio::test]
async fn test_list_media() {
    let app = setup_test_app();
    let (status, body) = get_request(&app.router, "/api/v1/media").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for url in ["http://x/1.png", "http://x/2.mp4"] {
        post_json(&app.router, "/api/v1/media", json!({"url": url, "type": "image"})).await;
    }
    let (_, body) = get_request(&app.router, "/api/v1/media").await;
    let urls: Vec<&str> = body.as_array().unwrap().iter().map(|m| m["url"].as_str().unwrap()).collect();
    assert_eq!(urls, vec!["http://x/1.png", "http://x/2.mp4"]);
}

#[tokio::test]
async fn test_create_media_requires_url_and_type() {
    let app = setup_test_app();
    for body in [json!({"url": "http://x/a.jpg"}), json!({"type": "image"}), json!({"url": "", "type": ""})] {
        let (status, resp) = post_json(&app.router, "/api/v1/media", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&resp, 400, "URL and type are required");
    }
}

#[tokio::test]
async fn test_create_media_with_malformed_body() {
    let app = setup_test_app();
    let (status, resp) = send_raw(&app.router, axum::http::Method::POST, "/api/v1/media", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 400);
    assert!(!resp["message"].as_str().unwrap().is_empty());

    let (status, resp) = post_json(&app.router, "/api/v1/media", json!({"url": 5, "type": "image"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 400);
}

#[tokio::test]
async fn test_media_invalid_and_missing_ids() {
    let app = setup_test_app();
    let (status, resp) = get_request(&app.router, "/api/v1/media/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&resp, 400, "Invalid media ID");

    let (status, resp) = delete_request(&app.router, "/api/v1/media/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&resp, 404, "Media not found");
}

#[tokio::test]
async fn test_media_has_no_update_route() {
    let app = setup_test_app();
    post_json(&app.router, "/api/v1/media", json!({"url": "u", "type": "image"})).await;
    let (status, _) = put_json(&app.router, "/api/v1/media/1", json!({"url": "v"})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_media_store_failure_is_internal_error() {
    let app = setup_test_app();
    app.store.set_unavailable(true);
    let (status, resp) = get_request(&app.router, "/api/v1/media").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["code"], 500);
    assert_eq!(
        resp["message"].as_str(),
        Some(sqlx::Error::PoolTimedOut.to_string().as_str())
    );
}
