// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! TikTok three-step publish (init, chunk upload, confirm) against a fake
//! Open API, plus status polling through the HTTP route.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use social_publisher::models::{
    AccessTokens, AccountIds, MediaItem, Platform, PostContent, Privacy, Tokens, UnifiedPost,
};
use social_publisher::platforms::tiktok::ChunkPlan;
use social_publisher::platforms::TikTokApi;
use std::collections::BTreeMap;
use tower::ServiceExt;

mod common;

use common::Recorded;

const VIDEO_LEN: usize = 4096;

fn ok_envelope(data: Value) -> Json<Value> {
    Json(json!({ "data": data, "error": { "code": "ok", "message": "" } }))
}

fn fake_tiktok(rec: Recorded) -> Router {
    Router::new()
        .route(
            "/video.mp4",
            get(|| async { vec![7u8; VIDEO_LEN] }),
        )
        .route(
            "/v2/post/publish/video/init/",
            post(
                |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().push(json!({ "init": body }));
                    let host = headers
                        .get(header::HOST)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    ok_envelope(json!({
                        "publish_id": "v_pub_file~v2.1",
                        "upload_url": format!("http://{}/upload", host),
                    }))
                },
            ),
        )
        .route(
            "/upload",
            put(
                |State(rec): State<Recorded>, headers: HeaderMap, body: Bytes| async move {
                    let range = headers
                        .get("content-range")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    rec.lock()
                        .unwrap()
                        .push(json!({ "put": { "range": range, "len": body.len() } }));
                    StatusCode::CREATED
                },
            ),
        )
        .route(
            "/v2/post/publish/",
            post(|State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                rec.lock().unwrap().push(json!({ "confirm": body }));
                ok_envelope(json!({}))
            }),
        )
        .route(
            "/v2/post/publish/status/fetch/",
            post(|| async {
                ok_envelope(json!({
                    "status": "PUBLISH_COMPLETE",
                    "publicaly_available_post_id": [7312345678901234567u64],
                }))
            }),
        )
        .with_state(rec)
}

fn video_post(base: &str) -> UnifiedPost {
    let mut post = UnifiedPost::new(
        Platform::Tiktok,
        PostContent {
            text: Some("Behind the scenes".into()),
            hashtags: vec!["bts".into()],
            media: vec![MediaItem::video(format!("{}/video.mp4", base))],
            ..Default::default()
        },
    );
    post.privacy = Privacy::Private;
    post.platform_specific.disable_duet = Some(true);
    post
}

#[tokio::test]
async fn test_tiktok_publish_runs_all_three_steps() {
    let rec = common::recorder();
    let base = common::spawn_fake_api(fake_tiktok(rec.clone())).await;

    let mut adapters = common::test_adapters();
    adapters.tiktok = TikTokApi::new(common::test_credentials(Platform::Tiktok)).with_api_base(&base);
    let manager = common::test_manager(adapters);

    let tokens: AccessTokens = BTreeMap::from([(Platform::Tiktok, "tt-token".to_string())]);
    let result = manager.publish_post(&video_post(&base), &tokens).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    // The post id only exists after processing; the publish id is returned.
    assert_eq!(result.post_id.as_deref(), Some("v_pub_file~v2.1"));

    let seen = rec.lock().unwrap();
    assert_eq!(seen.len(), 3);

    let init = &seen[0]["init"];
    assert_eq!(init["source_info"]["source"], "FILE_UPLOAD");
    assert_eq!(init["source_info"]["video_size"], VIDEO_LEN as u64);
    assert_eq!(init["source_info"]["total_chunk_count"], 1);
    assert_eq!(init["post_info"]["privacy_level"], "SELF_ONLY");
    assert_eq!(init["post_info"]["disable_duet"], true);

    assert_eq!(
        seen[1]["put"]["range"],
        format!("bytes 0-{}/{}", VIDEO_LEN - 1, VIDEO_LEN)
    );
    assert_eq!(seen[1]["put"]["len"], VIDEO_LEN as u64);

    assert_eq!(seen[2]["confirm"]["publish_id"], "v_pub_file~v2.1");
}

#[tokio::test]
async fn test_tiktok_rejects_image_posts_before_network() {
    let rec = common::recorder();
    let base = common::spawn_fake_api(fake_tiktok(rec.clone())).await;

    let mut adapters = common::test_adapters();
    adapters.tiktok = TikTokApi::new(common::test_credentials(Platform::Tiktok)).with_api_base(&base);
    let manager = common::test_manager(adapters);

    let post = UnifiedPost::new(
        Platform::Tiktok,
        PostContent {
            media: vec![MediaItem::image(format!("{}/still.png", base))],
            ..Default::default()
        },
    );
    let tokens: AccessTokens = BTreeMap::from([(Platform::Tiktok, "tt-token".to_string())]);
    let result = manager.publish_post(&post, &tokens).await;

    assert!(!result.success);
    assert!(rec.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_token_envelope_is_auth_error() {
    let fake = Router::new().route(
        "/v2/user/info/",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "data": {},
                    "error": { "code": "access_token_invalid", "message": "expired" }
                })),
            )
        }),
    );
    let base = common::spawn_fake_api(fake).await;

    let tiktok = TikTokApi::new(common::test_credentials(Platform::Tiktok)).with_api_base(&base);
    let err = tiktok.get_user_info("stale").await.unwrap_err();
    assert!(err.is_auth_error());
}

#[test]
fn test_large_video_is_split_into_chunks() {
    let plan = ChunkPlan::for_size(25_000_000).unwrap();
    assert_eq!(plan.chunk_size, 10_000_000);
    assert_eq!(plan.total_chunk_count, 2);

    let ranges: Vec<(u64, u64)> = plan.ranges().collect();
    assert_eq!(ranges, vec![(0, 9_999_999), (10_000_000, 24_999_999)]);
}

#[tokio::test]
async fn test_publish_status_route() {
    let rec = common::recorder();
    let base = common::spawn_fake_api(fake_tiktok(rec)).await;

    let mut adapters = common::test_adapters();
    adapters.tiktok = TikTokApi::new(common::test_credentials(Platform::Tiktok)).with_api_base(&base);
    let (app, state) = common::create_test_app_with(adapters);

    state.store.put(
        "user-1",
        Platform::Tiktok,
        Tokens {
            access_token: "tt-token".into(),
            refresh_token: Some("tt-refresh".into()),
            expires_at: None,
            scopes: Default::default(),
            user_id: Some("open-1".into()),
        },
        AccountIds::default(),
    );

    let token = common::create_test_jwt("user-1");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tiktok/publish/v_pub_file~v2.1")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "PUBLISH_COMPLETE");
}
