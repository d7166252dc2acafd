// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! OAuth provider callbacks.
//!
//! The user is identified by the signed `state` issued from
//! `/api/connect/{platform}`, not by a session cookie, since the browser
//! arrives here straight from the provider.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{AccountIds, Platform, Tokens};
use crate::routes::parse_platform;
use crate::services::OAuthState;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/{platform}/callback", get(auth_callback))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange the code, discover account ids, store credentials and send the
/// browser back to the frontend.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let platform = parse_platform(&platform)?;
    let frontend_url = &state.config.frontend_url;

    if let Some(error) = params.error {
        tracing::warn!(
            %platform,
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "OAuth error from provider"
        );
        return Ok(failure_redirect(frontend_url, platform, &error));
    }

    let (Some(code), Some(raw_state)) = (params.code, params.state) else {
        return Err(AppError::BadRequest(
            "code and state are required".to_string(),
        ));
    };

    let oauth_state = match OAuthState::verify(
        &raw_state,
        &state.config.oauth_state_key,
        platform,
        Utc::now(),
    ) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(%platform, error = %e, "Rejected OAuth state");
            return Ok(failure_redirect(frontend_url, platform, "invalid_state"));
        }
    };

    let code_verifier = if platform == Platform::Twitter {
        state.store.take_pkce_verifier(&oauth_state.nonce)
    } else {
        None
    };

    let mut tokens = match state
        .manager
        .exchange_code_for_token(platform, &code, code_verifier.as_deref())
        .await
    {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(%platform, user_id = %oauth_state.user_id, error = %e, "Code exchange failed");
            return Ok(failure_redirect(frontend_url, platform, "token_exchange_failed"));
        }
    };

    let account_ids = discover_account_ids(&state, platform, &mut tokens).await;

    tracing::info!(
        %platform,
        user_id = %oauth_state.user_id,
        page_id = ?account_ids.page_id,
        instagram_account_id = ?account_ids.instagram_account_id,
        author_id = ?account_ids.author_id,
        "Platform connected"
    );
    state
        .store
        .put(&oauth_state.user_id, platform, tokens, account_ids);

    Ok(Redirect::temporary(&format!(
        "{}/connections?connected={}",
        frontend_url, platform
    )))
}

fn failure_redirect(frontend_url: &str, platform: Platform, error: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}/connections?error={}&platform={}",
        frontend_url,
        urlencoding::encode(error),
        platform
    ))
}

/// Look up the ids publishing needs later. Failures only cost the user a
/// manual id at publish time, so they are logged and skipped.
///
/// For Facebook the first managed page is selected and its page token
/// replaces the user token, since page posts require it.
async fn discover_account_ids(
    state: &AppState,
    platform: Platform,
    tokens: &mut Tokens,
) -> AccountIds {
    let mut ids = AccountIds::default();

    match platform {
        Platform::Facebook => match state.manager.facebook().get_pages(&tokens.access_token).await
        {
            Ok(pages) => {
                if let Some(page) = pages.into_iter().next() {
                    if let Some(page_token) = page.access_token {
                        tokens.access_token = page_token;
                    }
                    ids.page_id = Some(page.id);
                } else {
                    tracing::warn!(%platform, "User manages no Facebook pages");
                }
            }
            Err(e) => tracing::warn!(%platform, error = %e, "Failed to list pages"),
        },
        Platform::Instagram => {
            let pages = match state.manager.facebook().get_pages(&tokens.access_token).await {
                Ok(pages) => pages,
                Err(e) => {
                    tracing::warn!(%platform, error = %e, "Failed to list pages");
                    Vec::new()
                }
            };
            for page in pages {
                match state
                    .manager
                    .instagram()
                    .get_account_for_page(&page.id, &tokens.access_token)
                    .await
                {
                    Ok(Some(account_id)) => {
                        ids.page_id = Some(page.id);
                        ids.instagram_account_id = Some(account_id);
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(%platform, page_id = %page.id, error = %e, "Instagram account lookup failed")
                    }
                }
            }
            if ids.instagram_account_id.is_none() {
                tracing::warn!(%platform, "No Instagram business account linked to any page");
            }
        }
        Platform::Linkedin => match state.manager.linkedin().get_profile(&tokens.access_token).await
        {
            Ok(profile) => ids.author_id = Some(profile.id),
            Err(e) => tracing::warn!(%platform, error = %e, "Failed to fetch LinkedIn profile"),
        },
        Platform::Tiktok => ids.open_id = tokens.user_id.clone(),
        Platform::Twitter | Platform::Youtube => {}
    }

    ids
}
