// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Facebook Pages adapter (Graph API v18.0).
//!
//! Publishing is a single `/{page}/feed` call. Media is uploaded first as
//! unpublished photos/videos whose ids are attached to the feed post; a
//! failed asset is skipped rather than failing the post.

use super::graph::{self, GraphId, InsightsEnvelope, DIALOG_BASE, GRAPH_BASE};
use super::http::{char_len, network_error};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{
    AccountProfile, MediaItem, MediaType, Platform, PostContent, Privacy, Scheduling,
    TokenValidation, Tokens,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

const PLATFORM: Platform = Platform::Facebook;

/// Maximum characters in a page post message.
pub const MAX_MESSAGE_CHARS: usize = 63_206;
/// Scheduled posts must be at least this far in the future...
const MIN_SCHEDULE_LEAD_MINUTES: i64 = 10;
/// ...and at most this far.
const MAX_SCHEDULE_LEAD_DAYS: i64 = 75;

/// Facebook Graph API client.
#[derive(Clone)]
pub struct FacebookApi {
    http: reqwest::Client,
    graph_base: String,
    dialog_base: String,
    creds: PlatformCredentials,
}

impl FacebookApi {
    /// Permissions requested in the login dialog. Includes the Instagram
    /// permissions because Instagram business accounts share this dialog.
    pub const SCOPES: &'static [&'static str] = &[
        "pages_show_list",
        "pages_read_engagement",
        "pages_manage_posts",
        "read_insights",
        "instagram_basic",
        "instagram_content_publish",
        "instagram_manage_insights",
    ];

    pub fn new(creds: PlatformCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            graph_base: GRAPH_BASE.to_string(),
            dialog_base: DIALOG_BASE.to_string(),
            creds,
        }
    }

    /// Point Graph calls at another host (tests, proxies).
    pub fn with_graph_base(mut self, base: impl Into<String>) -> Self {
        self.graph_base = base.into().trim_end_matches('/').to_string();
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    pub fn get_auth_url(&self, state: Option<&str>) -> String {
        graph::dialog_url(&self.dialog_base, &self.creds, Self::SCOPES, state)
    }

    /// Exchange a code, then upgrade to a long-lived page-capable token.
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

    pub async fn get_profile(&self, access_token: &str) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/me", self.graph_base))
            .bearer_auth(access_token)
            .query(&[("fields", "id,name,picture")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let me: FacebookUser = graph::graph_json(PLATFORM, response).await?;
        Ok(AccountProfile {
            id: me.id,
            username: None,
            display_name: me.name,
            avatar_url: me.picture.and_then(|p| p.data.url),
        })
    }

    /// Pages the user manages, each with its own page access token.
    pub async fn get_pages(&self, access_token: &str) -> Result<Vec<FacebookPage>, SocialError> {
        let response = self
            .http
            .get(format!("{}/me/accounts", self.graph_base))
            .bearer_auth(access_token)
            .query(&[("fields", "id,name,access_token,category")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let pages: GraphList<FacebookPage> = graph::graph_json(PLATFORM, response).await?;
        Ok(pages.data)
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    /// Pre-flight checks for a page post.
    pub fn validate_post(
        content: &PostContent,
        privacy: Privacy,
        scheduling: Option<&Scheduling>,
    ) -> Result<(), SocialError> {
        if privacy != Privacy::Public {
            return Err(SocialError::validation(
                PLATFORM,
                format!("page posts are always public; '{}' is not supported", privacy),
            ));
        }

        let message = content.text_with_hashtags();
        if message.trim().is_empty() && content.media.is_empty() {
            return Err(SocialError::validation(
                PLATFORM,
                "a post needs a message or at least one media item",
            ));
        }
        if char_len(&message) > MAX_MESSAGE_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("message exceeds {} characters", MAX_MESSAGE_CHARS),
            ));
        }

        if let Some(schedule) = scheduling {
            let now = Utc::now();
            if schedule.publish_at < now + Duration::minutes(MIN_SCHEDULE_LEAD_MINUTES) {
                return Err(SocialError::validation(
                    PLATFORM,
                    "scheduled time must be at least 10 minutes in the future",
                ));
            }
            if schedule.publish_at > now + Duration::days(MAX_SCHEDULE_LEAD_DAYS) {
                return Err(SocialError::validation(
                    PLATFORM,
                    "scheduled time must be within 75 days",
                ));
            }
        }

        Ok(())
    }

    /// Upload a photo by URL without publishing it. Returns the media id.
    pub async fn upload_photo(
        &self,
        page_id: &str,
        access_token: &str,
        url: &str,
    ) -> Result<String, SocialError> {
        let body = serde_json::json!({ "url": url, "published": false });
        self.post_graph_id(&format!("{}/{}/photos", self.graph_base, page_id), access_token, &body)
            .await
    }

    /// Upload a video by URL without publishing it. Returns the media id.
    pub async fn upload_video(
        &self,
        page_id: &str,
        access_token: &str,
        url: &str,
        description: Option<&str>,
    ) -> Result<String, SocialError> {
        let body = serde_json::json!({
            "file_url": url,
            "published": false,
            "description": description,
        });
        self.post_graph_id(&format!("{}/{}/videos", self.graph_base, page_id), access_token, &body)
            .await
    }

    /// Create the feed post itself.
    pub async fn create_post(
        &self,
        page_id: &str,
        access_token: &str,
        request: &FacebookPostRequest,
    ) -> Result<String, SocialError> {
        let id = self
            .post_graph_id(&format!("{}/{}/feed", self.graph_base, page_id), access_token, request)
            .await?;
        tracing::info!(page_id, post_id = %id, scheduled = request.scheduled_publish_time.is_some(), "Facebook post created");
        Ok(id)
    }

    /// Upload media (tolerating per-asset failures) and create the post.
    pub async fn publish(
        &self,
        page_id: &str,
        access_token: &str,
        content: &PostContent,
        scheduling: Option<&Scheduling>,
        link: Option<&str>,
    ) -> Result<FacebookPublishOutcome, SocialError> {
        let mut media_ids = Vec::new();
        let mut skipped_media = Vec::new();

        for item in &content.media {
            match self.upload_media_item(page_id, access_token, item, content).await {
                Ok(id) => media_ids.push(id),
                Err(e) => {
                    tracing::warn!(page_id, url = %item.url, error = %e, "Media upload failed, continuing without it");
                    skipped_media.push(format!("{}: {}", item.url, e));
                }
            }
        }

        let message = content.text_with_hashtags();
        let request = FacebookPostRequest {
            message: (!message.is_empty()).then_some(message),
            link: link.map(str::to_string),
            attached_media: media_ids
                .iter()
                .map(|id| AttachedMedia {
                    media_fbid: id.clone(),
                })
                .collect(),
            published: scheduling.is_none(),
            scheduled_publish_time: scheduling.map(|s| s.publish_at.timestamp()),
        };

        let post_id = self.create_post(page_id, access_token, &request).await?;

        Ok(FacebookPublishOutcome {
            post_id,
            media_ids,
            skipped_media,
        })
    }

    async fn upload_media_item(
        &self,
        page_id: &str,
        access_token: &str,
        item: &MediaItem,
        content: &PostContent,
    ) -> Result<String, SocialError> {
        match item.media_type {
            MediaType::Image => self.upload_photo(page_id, access_token, &item.url).await,
            MediaType::Video => {
                self.upload_video(page_id, access_token, &item.url, content.description.as_deref())
                    .await
            }
        }
    }

    // ─── Analytics ───────────────────────────────────────────────────────────

    /// Insights plus engagement counters for a page post. Either half may
    /// fail on its own; the lookup only errors when both do.
    pub async fn get_post_insights(
        &self,
        post_id: &str,
        access_token: &str,
    ) -> Result<FacebookPostInsights, SocialError> {
        let (insights, counters) = tokio::join!(
            self.get_insight_values(post_id, access_token),
            self.get_post_counters(post_id, access_token),
        );

        let (insights, counters) = match (insights, counters) {
            (Err(e), Err(_)) => return Err(e),
            (insights, counters) => (
                insights.unwrap_or_else(|e| {
                    tracing::warn!(post_id, error = %e, "Failed to fetch Facebook post insights");
                    InsightsEnvelope::default()
                }),
                counters
                    .map_err(|e| {
                        tracing::warn!(post_id, error = %e, "Failed to fetch Facebook post counters");
                    })
                    .ok(),
            ),
        };

        Ok(FacebookPostInsights {
            impressions: insights.value("post_impressions"),
            reach: insights.value("post_impressions_unique"),
            engaged_users: insights.value("post_engaged_users"),
            reactions: insights.value("post_reactions_by_type_total"),
            comments: counters
                .as_ref()
                .and_then(|c| c.comments.as_ref())
                .and_then(|c| c.summary.total_count),
            shares: counters.and_then(|c| c.shares).map(|s| s.count),
        })
    }

    async fn get_insight_values(
        &self,
        post_id: &str,
        access_token: &str,
    ) -> Result<InsightsEnvelope, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}/insights", self.graph_base, post_id))
            .bearer_auth(access_token)
            .query(&[(
                "metric",
                "post_impressions,post_impressions_unique,post_engaged_users,post_reactions_by_type_total",
            )])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        graph::graph_json(PLATFORM, response).await
    }

    async fn get_post_counters(
        &self,
        post_id: &str,
        access_token: &str,
    ) -> Result<PostCounters, SocialError> {
        let response = self
            .http
            .get(format!("{}/{}", self.graph_base, post_id))
            .bearer_auth(access_token)
            .query(&[("fields", "shares,comments.summary(true).limit(0)")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        graph::graph_json(PLATFORM, response).await
    }

    async fn post_graph_id<B: Serialize + ?Sized>(
        &self,
        url: &str,
        access_token: &str,
        body: &B,
    ) -> Result<String, SocialError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        let created: GraphId = graph::graph_json(PLATFORM, response).await?;
        Ok(created.id)
    }
}

/// Body of `POST /{page}/feed`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FacebookPostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attached_media: Vec<AttachedMedia>,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_publish_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachedMedia {
    pub media_fbid: String,
}

/// Result of [`FacebookApi::publish`].
#[derive(Debug, Clone)]
pub struct FacebookPublishOutcome {
    pub post_id: String,
    pub media_ids: Vec<String>,
    /// Assets that failed to upload, with the reason.
    pub skipped_media: Vec<String>,
}

/// Raw engagement for a page post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacebookPostInsights {
    pub impressions: Option<u64>,
    pub reach: Option<u64>,
    pub engaged_users: Option<u64>,
    pub reactions: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
}

/// A page the user manages.
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPage {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<PictureEnvelope>,
}

#[derive(Debug, Deserialize)]
struct PictureEnvelope {
    data: PictureData,
}

#[derive(Debug, Deserialize)]
struct PictureData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostCounters {
    #[serde(default)]
    shares: Option<ShareCount>,
    #[serde(default)]
    comments: Option<CommentsSummary>,
}

#[derive(Debug, Deserialize)]
struct ShareCount {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct CommentsSummary {
    summary: SummaryCount,
}

#[derive(Debug, Deserialize)]
struct SummaryCount {
    #[serde(default)]
    total_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_post_is_rejected() {
        let err = FacebookApi::validate_post(&PostContent::default(), Privacy::Public, None)
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation { .. }));
    }

    #[test]
    fn private_posts_are_rejected() {
        let err = FacebookApi::validate_post(&PostContent::text("hi"), Privacy::Private, None)
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation { .. }));
    }

    #[test]
    fn schedule_window_is_enforced() {
        let content = PostContent::text("later");
        let too_soon = Scheduling {
            publish_at: Utc::now() + Duration::minutes(2),
            timezone: "UTC".into(),
        };
        assert!(FacebookApi::validate_post(&content, Privacy::Public, Some(&too_soon)).is_err());

        let ok = Scheduling {
            publish_at: Utc::now() + Duration::days(2),
            timezone: "Europe/Paris".into(),
        };
        assert!(FacebookApi::validate_post(&content, Privacy::Public, Some(&ok)).is_ok());
    }

    #[test]
    fn scheduled_request_is_unpublished() {
        let request = FacebookPostRequest {
            message: Some("hi".into()),
            published: false,
            scheduled_publish_time: Some(1_900_000_000),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["published"], false);
        assert_eq!(json["scheduled_publish_time"], 1_900_000_000);
        assert!(json.get("attached_media").is_none());
    }
}
