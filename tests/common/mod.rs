// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

use axum::Router;
use serde_json::Value;
use social_publisher::config::{Config, PlatformCredentials};
use social_publisher::middleware::auth::create_jwt;
use social_publisher::models::Platform;
use social_publisher::routes::create_router;
use social_publisher::services::{Adapters, SocialMediaManager};
use social_publisher::AppState;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Request bodies seen by a fake vendor API, in arrival order.
pub type Recorded = Arc<Mutex<Vec<Value>>>;

#[allow(dead_code)]
pub fn recorder() -> Recorded {
    Arc::new(Mutex::new(Vec::new()))
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_fake_api(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake API listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Adapters built from the test config, pointing at the real vendor hosts.
/// Tests override the base URL of the adapter they exercise.
#[allow(dead_code)]
pub fn test_adapters() -> Adapters {
    Adapters::from_config(&Config::test_default().social)
}

/// Test OAuth client credentials for one platform.
#[allow(dead_code)]
pub fn test_credentials(platform: Platform) -> PlatformCredentials {
    Config::test_default().social.credentials(platform).clone()
}

#[allow(dead_code)]
pub fn test_manager(adapters: Adapters) -> SocialMediaManager {
    SocialMediaManager::from_adapters(adapters)
}

/// Create a test app with default adapters.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(test_adapters())
}

/// Create a test app whose manager uses the given adapters.
#[allow(dead_code)]
pub fn create_test_app_with(adapters: Adapters) -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState {
        config,
        manager: SocialMediaManager::from_adapters(adapters),
        store: social_publisher::db::CredentialStore::new(),
    });
    (create_router(state.clone()), state)
}

/// Session JWT for `user_id`, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let config = Config::test_default();
    create_jwt(user_id, &config.jwt_signing_key).expect("Failed to create JWT")
}
