// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Social-Publisher API Server
//!
//! Connects user accounts on six social networks and publishes, measures
//! and discovers content through one API.

use social_publisher::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    let port = config.port;
    tracing::info!(port, "Starting Social-Publisher API");

    if config.social.twitter_bearer_token.is_none() {
        tracing::warn!("TWITTER_BEARER_TOKEN not set, Twitter trends unavailable");
    }
    if config.social.youtube_api_key.is_none() {
        tracing::info!("YOUTUBE_API_KEY not set, YouTube trends use the user's token");
    }

    let state = Arc::new(AppState::new(config));
    let app = social_publisher::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("social_publisher=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
