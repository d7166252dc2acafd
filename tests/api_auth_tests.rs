// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! API authentication, CORS and connect-flow tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Sessions are accepted from the cookie or the bearer header
//! 3. The connect route issues a signed state (and PKCE for Twitter)

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use social_publisher::middleware::auth::{create_jwt, SESSION_COOKIE};
use social_publisher::models::Platform;
use social_publisher::services::OAuthState;
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn query_param(url: &str, name: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["platforms"].as_array().unwrap().len(), 6);
    assert_eq!(body["platforms"][2], "twitter");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connections")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_wrong_key() {
    let (app, _) = common::create_test_app();
    let token = create_jwt("user-1", b"some_other_signing_key_32_bytes!").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connections")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connections")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_connections_lists_every_platform_without_network() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connections")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let statuses = body.as_array().unwrap();
    assert_eq!(statuses.len(), Platform::ALL.len());
    for status in statuses {
        assert_eq!(status["connected"], false);
        assert_eq!(status["error"], "No access token");
    }
}

#[tokio::test]
async fn test_connect_issues_signed_state() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-42");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connect/linkedin")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?"));

    let raw_state = query_param(url, "state").unwrap();
    let decoded = OAuthState::verify(
        &raw_state,
        &state.config.oauth_state_key,
        Platform::Linkedin,
        Utc::now(),
    )
    .unwrap();
    assert_eq!(decoded.user_id, "user-42");
}

#[tokio::test]
async fn test_connect_twitter_stores_pkce_verifier() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-7");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connect/x")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let url = body_json(response).await["url"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(query_param(&url, "code_challenge_method").as_deref(), Some("S256"));
    let challenge = query_param(&url, "code_challenge").unwrap();

    let raw_state = query_param(&url, "state").unwrap();
    let decoded = OAuthState::verify(
        &raw_state,
        &state.config.oauth_state_key,
        Platform::Twitter,
        Utc::now(),
    )
    .unwrap();

    let verifier = state.store.take_pkce_verifier(&decoded.nonce).unwrap();
    assert_eq!(verifier.len(), 128);

    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use sha2::{Digest, Sha256};
    assert_eq!(
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
        challenge
    );
}

#[tokio::test]
async fn test_connect_unknown_platform() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/connect/myspace")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_cors_preflight_from_frontend() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/publish")
                .header(header::ORIGIN, state.config.frontend_url.as_str())
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        state.config.frontend_url.as_str()
    );
}
