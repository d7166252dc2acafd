// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Canonical data contracts shared by the facade and its callers.

pub mod analytics;
pub mod connection;
pub mod platform;
pub mod post;

pub use analytics::{Metrics, TrendingItem, TrendingResult, UnifiedAnalytics};
pub use connection::{
    AccessTokens, AccountIds, AccountProfile, ConnectionStatus, TokenValidation, Tokens,
};
pub use platform::{Platform, Privacy};
pub use post::{
    ArticleLink, MediaItem, MediaType, PlatformSpecific, PollSpec, PostContent, PublishResult,
    Scheduling, UnifiedPost,
};
