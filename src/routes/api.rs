// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    AccessTokens, ConnectionStatus, Platform, PublishResult, TrendingResult, UnifiedAnalytics,
    UnifiedPost,
};
use crate::platforms::tiktok::PublishStatus;
use crate::platforms::TwitterApi;
use crate::routes::parse_platform;
use crate::services::OAuthState;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/connect/{platform}", get(connect))
        .route("/api/connections", get(list_connections))
        .route(
            "/api/connections/{platform}",
            axum::routing::delete(disconnect),
        )
        .route("/api/connections/{platform}/refresh", post(refresh))
        .route("/api/publish", post(publish))
        .route("/api/analytics", post(analytics))
        .route("/api/trending", get(trending))
        .route("/api/tiktok/publish/{publish_id}", get(tiktok_publish_status))
}

fn invalid(e: validator::ValidationErrors) -> AppError {
    AppError::BadRequest(e.to_string())
}

// ─── Connections ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConnectResponse {
    pub url: String,
}

/// Authorization URL for one platform, bound to the caller by signed state.
async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
) -> Result<Json<ConnectResponse>> {
    let platform = parse_platform(&platform)?;

    let oauth_state = OAuthState::new(&user.user_id, platform)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let encoded = oauth_state
        .encode(&state.config.oauth_state_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let challenge = if platform == Platform::Twitter {
        let pkce = TwitterApi::generate_code_challenge()?;
        state
            .store
            .put_pkce_verifier(&oauth_state.nonce, pkce.code_verifier);
        Some(pkce.code_challenge)
    } else {
        None
    };

    let url = state
        .manager
        .get_auth_url(platform, Some(&encoded), challenge.as_deref())?;

    tracing::info!(user_id = %user.user_id, %platform, "Starting OAuth flow");
    Ok(Json(ConnectResponse { url }))
}

/// Status of every platform; unconnected ones report "No access token".
async fn list_connections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<Vec<ConnectionStatus>> {
    let stored = state.store.access_tokens(&user.user_id);
    let tokens: AccessTokens = Platform::ALL
        .into_iter()
        .map(|p| (p, stored.get(&p).cloned().unwrap_or_default()))
        .collect();

    Json(state.manager.check_connection_status(&tokens).await)
}

async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
) -> Result<StatusCode> {
    let platform = parse_platform(&platform)?;
    state
        .store
        .delete(&user.user_id, platform)
        .ok_or_else(|| AppError::NotFound(format!("{} is not connected", platform)))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
) -> Result<Json<RefreshResponse>> {
    let platform = parse_platform(&platform)?;
    let record = state
        .store
        .get(&user.user_id, platform)
        .ok_or_else(|| AppError::NotFound(format!("{} is not connected", platform)))?;

    let refresh_token = record.tokens.refresh_token.clone().unwrap_or_default();
    if refresh_token.is_empty() && platform.supports_refresh() {
        return Err(AppError::BadRequest(format!(
            "No refresh token stored for {}",
            platform
        )));
    }

    let mut tokens = state
        .manager
        .refresh_tokens(platform, &refresh_token)
        .await?;
    if tokens.user_id.is_none() {
        tokens.user_id = record.tokens.user_id;
    }

    let expires_at = tokens.expires_at;
    state.store.update_tokens(&user.user_id, platform, tokens);
    tracing::info!(user_id = %user.user_id, %platform, ?expires_at, "Tokens refreshed");

    Ok(Json(RefreshResponse {
        platform,
        expires_at,
    }))
}

// ─── Publishing ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    /// At most 25 posts per batch.
    #[validate(length(min = 1, max = 25))]
    pub posts: Vec<UnifiedPost>,
}

/// Publish a batch. Per-post failures are reported in the results, so this
/// only fails for a malformed request.
async fn publish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<Vec<PublishResult>>> {
    request.validate().map_err(invalid)?;

    let posts: Vec<UnifiedPost> = request
        .posts
        .into_iter()
        .map(|post| with_stored_account_ids(&state, &user.user_id, post))
        .collect();
    let tokens = state.store.access_tokens(&user.user_id);

    let results = state.manager.publish_posts(&posts, &tokens).await;
    tracing::info!(
        user_id = %user.user_id,
        total = results.len(),
        succeeded = results.iter().filter(|r| r.success).count(),
        "Publish batch finished"
    );
    Ok(Json(results))
}

/// Fill account ids the caller left out from the connection record.
fn with_stored_account_ids(state: &AppState, user_id: &str, mut post: UnifiedPost) -> UnifiedPost {
    let ids = state.store.account_ids(user_id, post.platform);
    let specific = &mut post.platform_specific;
    if specific.page_id.is_none() {
        specific.page_id = ids.page_id;
    }
    if specific.instagram_account_id.is_none() {
        specific.instagram_account_id = ids.instagram_account_id;
    }
    if specific.author_id.is_none() {
        specific.author_id = ids.author_id;
    }
    if specific.open_id.is_none() {
        specific.open_id = ids.open_id;
    }
    post
}

// ─── Analytics & Trends ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    #[validate(length(min = 1))]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub post_ids: BTreeMap<Platform, Vec<String>>,
}

async fn analytics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AnalyticsRequest>,
) -> Result<Json<Vec<UnifiedAnalytics>>> {
    request.validate().map_err(invalid)?;

    let tokens = state.store.access_tokens(&user.user_id);
    Ok(Json(
        state
            .manager
            .get_unified_analytics(&request.platforms, &tokens, &request.post_ids)
            .await,
    ))
}

#[derive(Deserialize)]
struct TrendingQuery {
    /// Comma-separated platform names; all platforms when absent.
    #[serde(default)]
    platforms: Option<String>,
}

async fn trending(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<BTreeMap<Platform, TrendingResult>>> {
    let platforms = match query.platforms.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(list) => list
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<Platform>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Platform::ALL.to_vec(),
    };

    let tokens = state.store.access_tokens(&user.user_id);
    Ok(Json(
        state
            .manager
            .get_trending_content(&platforms, &tokens)
            .await,
    ))
}

// ─── TikTok ──────────────────────────────────────────────────

/// Poll a TikTok publish; the post id only exists once processing completes.
async fn tiktok_publish_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(publish_id): Path<String>,
) -> Result<Json<PublishStatus>> {
    let tokens = state.store.access_tokens(&user.user_id);
    let token = tokens
        .get(&Platform::Tiktok)
        .ok_or_else(|| AppError::NotFound("tiktok is not connected".to_string()))?;

    let status = state
        .manager
        .tiktok()
        .get_publish_status(token, &publish_id)
        .await?;
    Ok(Json(status))
}
