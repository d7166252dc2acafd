// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Instagram Graph API adapter (business/creator accounts).
//!
//! Publishing is two-phase: `POST /{account}/media` creates a container
//! that is not visible to anyone, then `POST /{account}/media_publish`
//! publishes it. A [`MediaContainer`] can only come from a successful
//! create call, and publishing consumes it. An unpublished container is
//! simply abandoned; the API has no delete call for it.

use super::graph::{self, GraphId, InsightsEnvelope, DIALOG_BASE, GRAPH_BASE};
use super::http::{char_len, network_error};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{
    AccountProfile, MediaItem, MediaType, Platform, PostContent, Privacy, TokenValidation, Tokens,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PLATFORM: Platform = Platform::Instagram;

pub const MAX_CAPTION_CHARS: usize = 2_200;
pub const MAX_HASHTAGS: usize = 30;
pub const MAX_CAROUSEL_ITEMS: usize = 10;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const MAX_CONTAINER_POLLS: u32 = 40;

/// Instagram Graph API client.
#[derive(Clone)]
pub struct InstagramApi {
    http: reqwest::Client,
    graph_base: String,
    dialog_base: String,
    creds: PlatformCredentials,
    poll_interval: Duration,
}

impl InstagramApi {
    pub const SCOPES: &'static [&'static str] = &[
        "instagram_basic",
        "instagram_content_publish",
        "instagram_manage_insights",
        "pages_show_list",
        "pages_read_engagement",
    ];

    pub fn new(creds: PlatformCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            graph_base: GRAPH_BASE.to_string(),
            dialog_base: DIALOG_BASE.to_string(),
            creds,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_graph_base(mut self, base: impl Into<String>) -> Self {
        self.graph_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Interval between video container status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Facebook login dialog requesting the Instagram permission set.
    pub fn get_auth_url(&self, state: Option<&str>) -> String {
        graph::dialog_url(&self.dialog_base, &self.creds, Self::SCOPES, state)
    }

    /// Same two-hop Graph exchange as Facebook, producing an Instagram record.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Tokens, SocialError> {
        graph::exchange_code_for_long_lived_token(
            &self.http,
            &self.graph_base,
            &self.creds,
            PLATFORM,
            code,
            Self::SCOPES,
        )
        .await
    }

    pub async fn validate_token(&self, access_token: &str) -> Result<TokenValidation, SocialError> {
        graph::debug_token(
            &self.http,
            &self.graph_base,
            &self.creds,
            PLATFORM,
            access_token,
        )
        .await
    }

    // ─── Account ─────────────────────────────────────────────────────────────

    /// Instagram business account linked to a Facebook page, if any.
    pub async fn get_account_for_page(
        &self,
        page_id: &str,
        access_token: &str,
    ) -> Result<Option<String>, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}", self.graph_base, page_id))
            .bearer_auth(access_token)
            .query(&[("fields", "instagram_business_account")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let page: PageWithAccount = graph::graph_json(PLATFORM, response).await?;
        Ok(page.instagram_business_account.map(|a| a.id))
    }

    pub async fn get_profile(
        &self,
        account_id: &str,
        access_token: &str,
    ) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}", self.graph_base, account_id))
            .bearer_auth(access_token)
            .query(&[("fields", "id,username,name,profile_picture_url")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let account: InstagramAccount = graph::graph_json(PLATFORM, response).await?;
        Ok(AccountProfile {
            id: account.id,
            username: account.username,
            display_name: account.name,
            avatar_url: account.profile_picture_url,
        })
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    pub fn validate_post(content: &PostContent, privacy: Privacy) -> Result<(), SocialError> {
        if privacy != Privacy::Public {
            return Err(SocialError::validation(
                PLATFORM,
                format!("posts are visible to the account audience; '{}' is not supported", privacy),
            ));
        }
        if content.media.is_empty() {
            return Err(SocialError::validation(
                PLATFORM,
                "Instagram posts require at least one image or video",
            ));
        }
        if content.media.len() > MAX_CAROUSEL_ITEMS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("carousels hold at most {} items", MAX_CAROUSEL_ITEMS),
            ));
        }

        let caption = content.text_with_hashtags();
        if char_len(&caption) > MAX_CAPTION_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("caption exceeds {} characters", MAX_CAPTION_CHARS),
            ));
        }
        let hashtag_count = caption
            .split_whitespace()
            .filter(|w| w.starts_with('#'))
            .count();
        if hashtag_count > MAX_HASHTAGS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("captions allow at most {} hashtags", MAX_HASHTAGS),
            ));
        }
        Ok(())
    }

    /// Phase one: create an unpublished media container.
    pub async fn create_media_object(
        &self,
        account_id: &str,
        access_token: &str,
        request: &MediaContainerRequest,
    ) -> Result<MediaContainer, SocialError> {
        let response = self
            .http
            .post(format!("{}/{}/media", self.graph_base, account_id))
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let created: GraphId = graph::graph_json(PLATFORM, response).await?;
        tracing::debug!(account_id, container_id = %created.id, "Instagram container created");
        Ok(MediaContainer {
            id: created.id,
            account_id: account_id.to_string(),
        })
    }

    /// Phase two: publish a container. Consumes it.
    pub async fn publish_media(
        &self,
        access_token: &str,
        container: MediaContainer,
    ) -> Result<PublishedMedia, SocialError> {
        let response = self
            .http
            .post(format!(
                "{}/{}/media_publish",
                self.graph_base, container.account_id
            ))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "creation_id": container.id }))
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let published: GraphId = graph::graph_json(PLATFORM, response).await?;
        tracing::info!(
            account_id = %container.account_id,
            media_id = %published.id,
            "Instagram media published"
        );
        Ok(PublishedMedia { id: published.id })
    }

    /// Processing state of a container (videos are processed asynchronously).
    pub async fn get_container_status(
        &self,
        container: &MediaContainer,
        access_token: &str,
    ) -> Result<ContainerStatus, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}", self.graph_base, container.id))
            .bearer_auth(access_token)
            .query(&[("fields", "status_code")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let status: ContainerStatusResponse = graph::graph_json(PLATFORM, response).await?;
        Ok(status.status_code)
    }

    /// Poll a container until it is ready to publish.
    async fn wait_until_ready(
        &self,
        container: &MediaContainer,
        access_token: &str,
    ) -> Result<(), SocialError> {
        for attempt in 1..=MAX_CONTAINER_POLLS {
            match self.get_container_status(container, access_token).await? {
                ContainerStatus::Finished | ContainerStatus::Published => return Ok(()),
                ContainerStatus::Error | ContainerStatus::Expired => {
                    return Err(SocialError::Upstream {
                        platform: PLATFORM,
                        status: 200,
                        message: format!("container {} failed processing", container.id),
                    });
                }
                ContainerStatus::InProgress | ContainerStatus::Unknown => {
                    tracing::debug!(container_id = %container.id, attempt, "Container still processing");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(SocialError::Upstream {
            platform: PLATFORM,
            status: 200,
            message: format!("container {} was not ready in time", container.id),
        })
    }

    /// Create and publish a single image, video (reel) or carousel post.
    ///
    /// Any failing step fails the whole call; success is only reported
    /// once `media_publish` returned an id.
    pub async fn create_post(
        &self,
        account_id: &str,
        access_token: &str,
        caption: &str,
        media: &[MediaItem],
    ) -> Result<PublishedMedia, SocialError> {
        let caption = (!caption.is_empty()).then(|| caption.to_string());

        let container = match media {
            [] => {
                return Err(SocialError::validation(
                    PLATFORM,
                    "Instagram posts require media",
                ))
            }
            [single] => {
                let request = MediaContainerRequest::for_item(single, caption, false);
                let container = self
                    .create_media_object(account_id, access_token, &request)
                    .await?;
                if single.media_type == MediaType::Video {
                    self.wait_until_ready(&container, access_token).await?;
                }
                container
            }
            items => {
                self.create_carousel(account_id, access_token, caption, items)
                    .await?
            }
        };

        self.publish_media(access_token, container).await
    }

    /// Children first, then the parent container that lists them.
    async fn create_carousel(
        &self,
        account_id: &str,
        access_token: &str,
        caption: Option<String>,
        items: &[MediaItem],
    ) -> Result<MediaContainer, SocialError> {
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let request = MediaContainerRequest::for_item(item, None, true);
            let child = self
                .create_media_object(account_id, access_token, &request)
                .await?;
            if item.media_type == MediaType::Video {
                self.wait_until_ready(&child, access_token).await?;
            }
            children.push(child.id);
        }

        let parent = MediaContainerRequest {
            media_type: Some(ContainerMediaType::Carousel),
            children: Some(children),
            caption,
            ..Default::default()
        };
        self.create_media_object(account_id, access_token, &parent)
            .await
    }

    // ─── Analytics ───────────────────────────────────────────────────────────

    /// Insight metrics and public counters of a media object. Some metrics
    /// do not exist for every media type, so each half is fetched on its own
    /// and the lookup only errors when both fail.
    pub async fn get_media_insights(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<InstagramMediaInsights, SocialError> {
        let (insights, counts) = tokio::join!(
            self.get_insight_values(media_id, access_token),
            self.get_media_counts(media_id, access_token),
        );

        let (insights, counts) = match (insights, counts) {
            (Err(e), Err(_)) => return Err(e),
            (insights, counts) => (
                insights.unwrap_or_else(|e| {
                    tracing::warn!(media_id, error = %e, "Failed to fetch Instagram insights");
                    InsightsEnvelope::default()
                }),
                counts.unwrap_or_else(|e| {
                    tracing::warn!(media_id, error = %e, "Failed to fetch Instagram media counts");
                    MediaCounts::default()
                }),
            ),
        };

        Ok(InstagramMediaInsights {
            impressions: insights.value("impressions"),
            reach: insights.value("reach"),
            saved: insights.value("saved"),
            shares: insights.value("shares"),
            like_count: counts.like_count,
            comments_count: counts.comments_count,
        })
    }

    async fn get_insight_values(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<InsightsEnvelope, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}/insights", self.graph_base, media_id))
            .bearer_auth(access_token)
            .query(&[("metric", "impressions,reach,saved,shares")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        graph::graph_json(PLATFORM, response).await
    }

    async fn get_media_counts(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<MediaCounts, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}", self.graph_base, media_id))
            .bearer_auth(access_token)
            .query(&[("fields", "like_count,comments_count")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        graph::graph_json(PLATFORM, response).await
    }
}

/// A created, not yet published container. Only obtainable from
/// [`InstagramApi::create_media_object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContainer {
    id: String,
    account_id: String,
}

impl MediaContainer {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A published media object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMedia {
    pub id: String,
}

/// Body of `POST /{account}/media`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaContainerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<ContainerMediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_carousel_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl MediaContainerRequest {
    fn for_item(item: &MediaItem, caption: Option<String>, is_carousel_item: bool) -> Self {
        match item.media_type {
            MediaType::Image => Self {
                image_url: Some(item.url.clone()),
                caption,
                is_carousel_item,
                ..Default::default()
            },
            MediaType::Video => Self {
                video_url: Some(item.url.clone()),
                // Standalone videos publish as reels; carousel children stay VIDEO.
                media_type: Some(if is_carousel_item {
                    ContainerMediaType::Video
                } else {
                    ContainerMediaType::Reels
                }),
                caption,
                is_carousel_item,
                cover_url: item.thumbnail.clone(),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerMediaType {
    Video,
    Reels,
    Carousel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    Finished,
    InProgress,
    Error,
    Expired,
    Published,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ContainerStatusResponse {
    status_code: ContainerStatus,
}

/// Raw engagement for one media object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstagramMediaInsights {
    pub impressions: Option<u64>,
    pub reach: Option<u64>,
    pub saved: Option<u64>,
    pub shares: Option<u64>,
    pub like_count: Option<u64>,
    pub comments_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaCounts {
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    comments_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PageWithAccount {
    #[serde(default)]
    instagram_business_account: Option<GraphIdRef>,
}

#[derive(Debug, Deserialize)]
struct GraphIdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct InstagramAccount {
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    profile_picture_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_posts_are_rejected() {
        assert!(InstagramApi::validate_post(&PostContent::text("hi"), Privacy::Public).is_err());
    }

    #[test]
    fn too_many_hashtags_are_rejected() {
        let content = PostContent {
            hashtags: (0..31).map(|i| format!("tag{}", i)).collect(),
            media: vec![MediaItem::image("https://cdn.example/a.jpg")],
            ..Default::default()
        };
        assert!(InstagramApi::validate_post(&content, Privacy::Public).is_err());
    }

    #[test]
    fn carousel_child_request_shape() {
        let request =
            MediaContainerRequest::for_item(&MediaItem::video("https://cdn/v.mp4"), None, true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["video_url"], "https://cdn/v.mp4");
        assert_eq!(json["media_type"], "VIDEO");
        assert_eq!(json["is_carousel_item"], true);
        assert!(json.get("caption").is_none());
    }

    #[test]
    fn single_image_request_omits_carousel_flag() {
        let request = MediaContainerRequest::for_item(
            &MediaItem::image("https://cdn/a.jpg"),
            Some("caption".into()),
            false,
        );
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("is_carousel_item").is_none());
        assert_eq!(json["caption"], "caption");
    }

    #[test]
    fn unknown_container_status_is_tolerated() {
        let status: ContainerStatusResponse =
            serde_json::from_str(r#"{"status_code":"SOMETHING_NEW"}"#).unwrap();
        assert_eq!(status.status_code, ContainerStatus::Unknown);
    }
}
