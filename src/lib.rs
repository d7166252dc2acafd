// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Social-Publisher: one publishing layer over six social networks.
//!
//! Per-platform adapters (Facebook, Instagram, Twitter/X, YouTube, LinkedIn,
//! TikTok) sit behind [`services::SocialMediaManager`], which normalizes
//! OAuth, publishing, analytics and trends. A thin axum API exposes the
//! manager to authenticated users.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod platforms;
pub mod routes;
pub mod services;

use config::Config;
use db::CredentialStore;
use services::SocialMediaManager;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub manager: SocialMediaManager,
    pub store: CredentialStore,
}

impl AppState {
    /// State with adapters built from `config`.
    pub fn new(config: Config) -> Self {
        let manager = SocialMediaManager::new(&config.social);
        Self {
            config,
            manager,
            store: CredentialStore::new(),
        }
    }
}
