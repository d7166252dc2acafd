// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Request validation for the publishing, connection and trends routes.
//! None of these reach a vendor API.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use social_publisher::models::{AccountIds, Platform, Tokens};
use tower::ServiceExt;

mod common;

fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let token = common::create_test_jwt("user-1");
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn tokens(access: &str) -> Tokens {
    Tokens {
        access_token: access.to_string(),
        refresh_token: None,
        expires_at: None,
        scopes: Default::default(),
        user_id: None,
    }
}

fn text_post(platform: &str) -> Value {
    json!({ "platform": platform, "content": { "text": "hello" } })
}

#[tokio::test]
async fn test_publish_rejects_empty_batch() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(Method::POST, "/api/publish", Some(json!({ "posts": [] }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_publish_rejects_oversized_batch() {
    let (app, _) = common::create_test_app();
    let posts: Vec<Value> = (0..26).map(|_| text_post("twitter")).collect();

    let response = app
        .oneshot(authed(Method::POST, "/api/publish", Some(json!({ "posts": posts }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_publish_reports_missing_connection_per_post() {
    let (app, _) = common::create_test_app();
    let posts: Vec<Value> = (0..25).map(|_| text_post("linkedin")).collect();

    let response = app
        .oneshot(authed(Method::POST, "/api/publish", Some(json!({ "posts": posts }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 25);
    for result in results {
        assert_eq!(result["platform"], "linkedin");
        assert_eq!(result["success"], false);
        assert!(result["error"]
            .as_str()
            .unwrap()
            .contains("No access token"));
    }
}

#[tokio::test]
async fn test_youtube_image_post_fails_per_post() {
    let (app, state) = common::create_test_app();
    // Connected, but YouTube rejects images before any network call.
    state.store.put(
        "user-1",
        Platform::Youtube,
        tokens("yt-token"),
        AccountIds::default(),
    );

    let post = json!({
        "platform": "youtube",
        "content": {
            "title": "Clip",
            "media": [{ "url": "https://cdn.example/a.png", "type": "image" }]
        }
    });
    let response = app
        .oneshot(authed(Method::POST, "/api/publish", Some(json!({ "posts": [post] }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["success"], false);
    assert!(body[0]["error"].as_str().unwrap().contains("video"));
}

#[tokio::test]
async fn test_publish_rejects_unknown_platform_in_body() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(
            Method::POST,
            "/api/publish",
            Some(json!({ "posts": [text_post("friendster")] })),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_disconnect_unknown_connection() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(Method::DELETE, "/api/connections/tiktok", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disconnect_removes_record() {
    let (app, state) = common::create_test_app();
    state
        .store
        .put("user-1", Platform::Tiktok, tokens("tt"), AccountIds::default());

    let response = app
        .oneshot(authed(Method::DELETE, "/api/connections/tiktok", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.store.get("user-1", Platform::Tiktok).is_none());
}

#[tokio::test]
async fn test_facebook_refresh_is_unsupported() {
    let (app, state) = common::create_test_app();
    state.store.put(
        "user-1",
        Platform::Facebook,
        tokens("fb"),
        AccountIds::default(),
    );

    let response = app
        .oneshot(authed(Method::POST, "/api/connections/facebook/refresh", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unsupported");
    assert_eq!(body["platform"], "facebook");
    // The stored credentials are left alone.
    assert_eq!(
        state
            .store
            .get("user-1", Platform::Facebook)
            .unwrap()
            .tokens
            .access_token,
        "fb"
    );
}

#[tokio::test]
async fn test_refresh_without_refresh_token() {
    let (app, state) = common::create_test_app();
    state.store.put(
        "user-1",
        Platform::Youtube,
        tokens("yt"),
        AccountIds::default(),
    );

    let response = app
        .oneshot(authed(Method::POST, "/api/connections/youtube/refresh", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_trending_rejects_unknown_platform() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(
            Method::GET,
            "/api/trending?platforms=twitter,geocities",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trending_reports_unavailable_platforms() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(
            Method::GET,
            "/api/trending?platforms=facebook,linkedin,instagram",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["facebook"]["status"], "not_available");
    assert_eq!(body["linkedin"]["status"], "not_available");
    assert_eq!(body["instagram"]["status"], "not_available");
    assert!(body.get("twitter").is_none());
}

#[tokio::test]
async fn test_analytics_requires_platforms() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(
            Method::POST,
            "/api/analytics",
            Some(json!({ "platforms": [], "postIds": {} })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tiktok_status_requires_connection() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(authed(Method::GET, "/api/tiktok/publish/v_pub_1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
