// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! One adapter per social network. Each owns its HTTP client, credentials
//! and base URLs, and speaks only its vendor's API.

pub mod facebook;
mod graph;
mod http;
pub mod instagram;
pub mod linkedin;
pub mod pkce;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

pub use facebook::FacebookApi;
pub use instagram::InstagramApi;
pub use linkedin::LinkedInApi;
pub use pkce::PkceChallenge;
pub use tiktok::TikTokApi;
pub use twitter::TwitterApi;
pub use youtube::YouTubeApi;
