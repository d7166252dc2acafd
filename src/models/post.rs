// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Canonical publish request and its per-post result.

use super::platform::{Platform, Privacy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single publish request targeting exactly one platform.
///
/// Publishing the same content to several platforms means building one
/// `UnifiedPost` per platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedPost {
    pub platform: Platform,
    pub content: PostContent,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<Scheduling>,
    #[serde(default)]
    pub platform_specific: PlatformSpecific,
}

impl UnifiedPost {
    /// Build a public, unscheduled post.
    pub fn new(platform: Platform, content: PostContent) -> Self {
        Self {
            platform,
            content,
            privacy: Privacy::Public,
            scheduling: None,
            platform_specific: PlatformSpecific::default(),
        }
    }
}

/// Post body shared by all platforms. Each adapter reads the subset it understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaItem>,
}

impl PostContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Text followed by hashtags, each prefixed with `#` exactly once.
    pub fn text_with_hashtags(&self) -> String {
        let base = self.text.clone().unwrap_or_default();
        let tags = self.hashtag_line();
        match (base.is_empty(), tags.is_empty()) {
            (_, true) => base,
            (true, false) => tags,
            (false, false) => format!("{}\n\n{}", base, tags),
        }
    }

    /// Space-separated `#tag` line.
    pub fn hashtag_line(&self) -> String {
        self.hashtags
            .iter()
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The first attached video, if any.
    pub fn first_video(&self) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.media_type == MediaType::Video)
    }
}

/// A media asset referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            media_type: MediaType::Image,
            thumbnail: None,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            media_type: MediaType::Video,
            thumbnail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// Requested future publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    pub publish_at: DateTime<Utc>,
    /// IANA zone the user picked; informational, `publish_at` is already UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Per-platform identifiers and options with no canonical equivalent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpecific {
    /// Facebook page that owns the post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    /// Instagram business account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_account_id: Option<String>,
    /// LinkedIn member id or full `urn:li:person:` URN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// TikTok open id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,

    /// Twitter: follow-up tweets posted as a reply chain after the first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread: Vec<String>,

    // TikTok interaction toggles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_duet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_comment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_stitch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_cover_timestamp_ms: Option<u64>,

    // LinkedIn content shapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollSpec>,

    // YouTube
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,

    /// Anything else, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Link share (LinkedIn article, Facebook link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleLink {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A poll attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSpec {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default = "default_poll_days")]
    pub duration_days: u32,
}

fn default_poll_days() -> u32 {
    7
}

/// Outcome of one publish attempt. Failures never escape as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub platform: Platform,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Sub-steps that failed without failing the post (skipped media, thumbnail).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PublishResult {
    pub fn published(platform: Platform, post_id: String, warnings: Vec<String>) -> Self {
        Self {
            platform,
            success: true,
            post_id: Some(post_id),
            error: None,
            warnings,
        }
    }

    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            post_id: None,
            error: Some(error.into()),
            warnings: Vec::new(),
        }
    }
}
