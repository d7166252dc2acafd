// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Services module - the facade and its helpers.

pub mod manager;
pub mod normalize;
pub mod oauth_state;

pub use manager::{Adapters, AuthUrls, PlatformApi, SocialMediaManager};
pub use normalize::{normalize_metrics, PlatformMetrics};
pub use oauth_state::{OAuthState, StateError};
