// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! YouTube Data API v3 adapter.
//!
//! Uploads use the resumable protocol in three steps:
//! 1. `start_resumable_upload` posts the metadata and gets the session URL
//!    back in the `Location` header
//! 2. `UploadSession::upload` PUTs the bytes to that URL
//! 3. `set_thumbnail` attaches a custom thumbnail (optional)
//!
//! Each step only accepts the value produced by the previous one.

use super::http::{
    char_len, check_response, check_response_json, network_error, open_media, query_string,
    token_response,
};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{
    AccountProfile, Platform, PostContent, Privacy, Scheduling, TokenValidation,
    Tokens, TrendingItem,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};

const PLATFORM: Platform = Platform::Youtube;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 5_000;
pub const MAX_TAGS_CHARS: usize = 500;
/// "People & Blogs".
const DEFAULT_CATEGORY_ID: &str = "22";
const DEFAULT_THUMBNAIL_TYPE: &str = "image/jpeg";

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeApi {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    token_url: String,
    authorize_url: String,
    creds: PlatformCredentials,
    api_key: Option<String>,
}

impl YouTubeApi {
    pub const SCOPES: &'static [&'static str] = &[
        "https://www.googleapis.com/auth/youtube.upload",
        "https://www.googleapis.com/auth/youtube",
        "https://www.googleapis.com/auth/youtube.readonly",
        "https://www.googleapis.com/auth/yt-analytics.readonly",
    ];

    pub fn new(creds: PlatformCredentials, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/youtube/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            creds,
            api_key,
        }
    }

    /// Serve the data, upload and token endpoints from one host (tests).
    pub fn with_google_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        self.api_base = format!("{}/youtube/v3", base);
        self.upload_base = format!("{}/upload/youtube/v3", base);
        self.token_url = format!("{}/token", base);
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Offline access with forced consent so Google always returns a refresh token.
    pub fn get_auth_url(&self, state: Option<&str>) -> String {
        let scope = Self::SCOPES.join(" ");
        let mut params = vec![
            ("client_id", self.creds.client_id.as_str()),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        format!("{}?{}", self.authorize_url, query_string(&params))
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Tokens, SocialError> {
        self.token_request(&[
            ("code", code),
            ("client_id", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.as_str()),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Google keeps the refresh token stable, so the response usually omits it.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens, SocialError> {
        let mut tokens = self
            .token_request(&[
                ("refresh_token", refresh_token),
                ("client_id", self.creds.client_id.as_str()),
                ("client_secret", self.creds.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }
        Ok(tokens)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Tokens, SocialError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| SocialError::oauth(PLATFORM, format!("Token request failed: {}", e)))?;

        let token: GoogleTokenResponse = token_response(PLATFORM, response).await?;
        Ok(Tokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Tokens::expiry_from_now(token.expires_in),
            scopes: Tokens::parse_scopes(token.scope.as_deref()),
            user_id: None,
        })
    }

    pub async fn validate_token(&self, access_token: &str) -> Result<TokenValidation, SocialError> {
        match self.get_channel(access_token).await {
            Ok(_) => Ok(TokenValidation {
                is_valid: true,
                ..Default::default()
            }),
            Err(e) if e.is_auth_error() => Ok(TokenValidation::default()),
            Err(e) => Err(e),
        }
    }

    /// The authenticated user's channel.
    pub async fn get_channel(&self, access_token: &str) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/channels", self.api_base))
            .bearer_auth(access_token)
            .query(&[("part", "snippet"), ("mine", "true")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let channels: ItemList<Channel> = check_response_json(PLATFORM, response).await?;
        let channel = channels
            .items
            .into_iter()
            .next()
            .ok_or_else(|| SocialError::parse(PLATFORM, "account has no YouTube channel"))?;

        Ok(AccountProfile {
            id: channel.id,
            username: channel.snippet.custom_url,
            display_name: Some(channel.snippet.title),
            avatar_url: channel
                .snippet
                .thumbnails
                .and_then(|t| t.default)
                .map(|t| t.url),
        })
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    /// Pre-flight checks. Runs before any download or API call.
    pub fn validate_post(content: &PostContent) -> Result<(), SocialError> {
        if content.first_video().is_none() {
            return Err(SocialError::validation(
                PLATFORM,
                "YouTube posts require a video media item",
            ));
        }

        let title = video_title(content);
        let title_len = char_len(title.trim());
        if title_len == 0 || title_len > MAX_TITLE_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("title must be 1-{} characters", MAX_TITLE_CHARS),
            ));
        }
        if title.contains('<') || title.contains('>') {
            return Err(SocialError::validation(
                PLATFORM,
                "title must not contain '<' or '>'",
            ));
        }
        if char_len(&video_description(content)) > MAX_DESCRIPTION_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("description exceeds {} characters", MAX_DESCRIPTION_CHARS),
            ));
        }
        let tags_len: usize = video_tags(content).iter().map(|t| char_len(t)).sum();
        if tags_len > MAX_TAGS_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("tags exceed {} characters in total", MAX_TAGS_CHARS),
            ));
        }
        Ok(())
    }

    /// Build upload metadata from canonical content.
    pub fn metadata_for(
        content: &PostContent,
        privacy: Privacy,
        scheduling: Option<&Scheduling>,
        category_id: Option<&str>,
    ) -> VideoMetadata {
        VideoMetadata {
            title: video_title(content).trim().to_string(),
            description: video_description(content),
            tags: video_tags(content),
            category_id: category_id.unwrap_or(DEFAULT_CATEGORY_ID).to_string(),
            privacy,
            publish_at: scheduling.map(|s| s.publish_at),
        }
    }

    /// Step one: register the upload and obtain the session URL.
    pub async fn start_resumable_upload(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        content_type: &str,
        content_length: u64,
    ) -> Result<UploadSession, SocialError> {
        let response = self
            .http
            .post(format!("{}/videos", self.upload_base))
            .bearer_auth(access_token)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&metadata.to_resource())
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let response = check_response(PLATFORM, response).await?;
        let url = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                SocialError::parse(PLATFORM, "resumable upload response has no Location header")
            })?;

        tracing::debug!("YouTube upload session started");
        Ok(UploadSession {
            http: self.http.clone(),
            url,
            access_token: access_token.to_string(),
            content_type: content_type.to_string(),
            content_length,
        })
    }

    /// Step three: attach a custom thumbnail to an uploaded video.
    pub async fn set_thumbnail(
        &self,
        access_token: &str,
        video: &UploadedVideo,
        image: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SocialError> {
        let response = self
            .http
            .post(format!("{}/thumbnails/set", self.upload_base))
            .bearer_auth(access_token)
            .query(&[("videoId", video.id.as_str())])
            .header(CONTENT_TYPE, content_type)
            .body(image)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        check_response(PLATFORM, response).await?;
        Ok(())
    }

    /// Download the video, upload it and apply the optional extras.
    ///
    /// Thumbnail and playlist failures do not fail the upload; they come
    /// back as warnings.
    pub async fn publish(
        &self,
        access_token: &str,
        content: &PostContent,
        privacy: Privacy,
        scheduling: Option<&Scheduling>,
        category_id: Option<&str>,
        playlist_id: Option<&str>,
    ) -> Result<YouTubePublishOutcome, SocialError> {
        Self::validate_post(content)?;
        let video_item = content
            .first_video()
            .ok_or_else(|| SocialError::validation(PLATFORM, "no video media item"))?;

        let media = open_media(&self.http, PLATFORM, &video_item.url).await?;
        let (body, len) = media.into_sized_body().await?;
        let metadata = Self::metadata_for(content, privacy, scheduling, category_id);
        let session = self
            .start_resumable_upload(access_token, &metadata, "video/*", len)
            .await?;
        let video = session.upload(body).await?;
        tracing::info!(video_id = %video.id, scheduled = scheduling.is_some(), "YouTube video uploaded");

        let mut warnings = Vec::new();

        if let Some(thumbnail_url) = &video_item.thumbnail {
            let result = async {
                let media = open_media(&self.http, PLATFORM, thumbnail_url).await?;
                let content_type = media
                    .image_content_type()
                    .unwrap_or_else(|| DEFAULT_THUMBNAIL_TYPE.to_string());
                let image = media.bytes().await?;
                self.set_thumbnail(access_token, &video, image, &content_type)
                    .await
            }
            .await;
            if let Err(e) = result {
                tracing::warn!(video_id = %video.id, error = %e, "Thumbnail upload failed");
                warnings.push(format!("thumbnail not set: {}", e));
            }
        }

        if let Some(playlist_id) = playlist_id {
            if let Err(e) = self
                .add_to_playlist(access_token, playlist_id, &video.id)
                .await
            {
                tracing::warn!(video_id = %video.id, playlist_id, error = %e, "Playlist insert failed");
                warnings.push(format!("not added to playlist {}: {}", playlist_id, e));
            }
        }

        Ok(YouTubePublishOutcome { video, warnings })
    }

    // ─── Playlists ───────────────────────────────────────────────────────────

    pub async fn create_playlist(
        &self,
        access_token: &str,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String, SocialError> {
        let body = serde_json::json!({
            "snippet": { "title": title, "description": description },
            "status": { "privacyStatus": privacy_status(privacy) },
        });
        let response = self
            .http
            .post(format!("{}/playlists", self.api_base))
            .bearer_auth(access_token)
            .query(&[("part", "snippet,status")])
            .json(&body)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let created: Resource = check_response_json(PLATFORM, response).await?;
        Ok(created.id)
    }

    pub async fn add_to_playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<String, SocialError> {
        let body = serde_json::json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": { "kind": "youtube#video", "videoId": video_id },
            }
        });
        let response = self
            .http
            .post(format!("{}/playlistItems", self.api_base))
            .bearer_auth(access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let created: Resource = check_response_json(PLATFORM, response).await?;
        Ok(created.id)
    }

    // ─── Analytics & discovery ───────────────────────────────────────────────

    pub async fn get_video_statistics(
        &self,
        access_token: &str,
        video_id: &str,
    ) -> Result<VideoStatistics, SocialError> {
        let response = self
            .http
            .get(format!("{}/videos", self.api_base))
            .bearer_auth(access_token)
            .query(&[("part", "statistics"), ("id", video_id)])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let videos: ItemList<VideoWithStatistics> =
            check_response_json(PLATFORM, response).await?;
        videos
            .items
            .into_iter()
            .next()
            .map(|v| v.statistics)
            .ok_or_else(|| SocialError::Upstream {
                platform: PLATFORM,
                status: 404,
                message: format!("video {} not found", video_id),
            })
    }

    /// Most popular videos in a region. Uses the API key when configured,
    /// otherwise the user's token.
    pub async fn get_trending(
        &self,
        access_token: Option<&str>,
        region_code: &str,
    ) -> Result<Vec<TrendingItem>, SocialError> {
        let mut request = self.http.get(format!("{}/videos", self.api_base)).query(&[
            ("part", "snippet,statistics"),
            ("chart", "mostPopular"),
            ("regionCode", region_code),
            ("maxResults", "25"),
        ]);
        request = match (&self.api_key, access_token) {
            (Some(key), _) => request.query(&[("key", key.as_str())]),
            (None, Some(token)) => request.bearer_auth(token),
            (None, None) => {
                return Err(SocialError::unsupported(
                    PLATFORM,
                    "trending without an API key or access token",
                ))
            }
        };

        let response = request.send().await.map_err(network_error(PLATFORM))?;
        let videos: ItemList<TrendingVideo> = check_response_json(PLATFORM, response).await?;

        Ok(videos
            .items
            .into_iter()
            .map(|v| TrendingItem {
                url: Some(format!("https://www.youtube.com/watch?v={}", v.id)),
                name: v.snippet.title,
                volume: v.statistics.and_then(|s| s.view_count),
            })
            .collect())
    }
}

/// Vendor privacy value for a canonical setting. YouTube has no
/// connections audience, so that maps to private.
pub fn privacy_status(privacy: Privacy) -> &'static str {
    match privacy {
        Privacy::Public => "public",
        Privacy::Private | Privacy::Connections => "private",
        Privacy::Unlisted => "unlisted",
    }
}

fn video_title(content: &PostContent) -> String {
    content
        .title
        .clone()
        .or_else(|| content.text.clone())
        .unwrap_or_default()
}

fn video_description(content: &PostContent) -> String {
    let body = content
        .description
        .clone()
        .or_else(|| content.text.clone())
        .unwrap_or_default();
    let tags = content.hashtag_line();
    match (body.is_empty(), tags.is_empty()) {
        (_, true) => body,
        (true, false) => tags,
        (false, false) => format!("{}\n\n{}", body, tags),
    }
}

fn video_tags(content: &PostContent) -> Vec<String> {
    content
        .hashtags
        .iter()
        .map(|t| t.trim_start_matches('#').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Metadata sent when a resumable upload starts.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: Privacy,
    pub publish_at: Option<DateTime<Utc>>,
}

impl VideoMetadata {
    /// Scheduled videos must be private until `publishAt`.
    fn to_resource(&self) -> VideoResource<'_> {
        let (privacy_status, publish_at) = match self.publish_at {
            Some(at) => ("private", Some(at.to_rfc3339_opts(SecondsFormat::Secs, true))),
            None => (privacy_status(self.privacy), None),
        };
        VideoResource {
            snippet: VideoSnippet {
                title: &self.title,
                description: &self.description,
                tags: &self.tags,
                category_id: &self.category_id,
            },
            status: VideoStatus {
                privacy_status,
                publish_at,
                self_declared_made_for_kids: false,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource<'a> {
    snippet: VideoSnippet<'a>,
    status: VideoStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
    category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    privacy_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_at: Option<String>,
    self_declared_made_for_kids: bool,
}

/// An open resumable upload. Only obtainable from
/// [`YouTubeApi::start_resumable_upload`].
#[derive(Debug)]
pub struct UploadSession {
    http: reqwest::Client,
    url: String,
    access_token: String,
    content_type: String,
    content_length: u64,
}

impl UploadSession {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Step two: send the video bytes. Consumes the session.
    /// The body must be exactly the length announced when the session started.
    pub async fn upload(self, body: impl Into<reqwest::Body>) -> Result<UploadedVideo, SocialError> {
        let response = self
            .http
            .put(&self.url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, self.content_type.as_str())
            .header(CONTENT_LENGTH, self.content_length)
            .body(body)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let video: Resource = check_response_json(PLATFORM, response).await?;
        Ok(UploadedVideo { id: video.id })
    }
}

/// A video YouTube has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct YouTubePublishOutcome {
    pub video: UploadedVideo,
    pub warnings: Vec<String>,
}

/// `statistics` part of a video. YouTube encodes counts as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "string_count")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "string_count")]
    pub like_count: Option<u64>,
    #[serde(default, deserialize_with = "string_count")]
    pub comment_count: Option<u64>,
    #[serde(default, deserialize_with = "string_count")]
    pub favorite_count: Option<u64>,
}

fn string_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VideoWithStatistics {
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
struct TrendingVideo {
    id: String,
    snippet: TrendingSnippet,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct TrendingSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    title: String,
    #[serde(default)]
    custom_url: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;

    fn video_content(title: &str) -> PostContent {
        PostContent {
            title: Some(title.to_string()),
            media: vec![MediaItem::video("https://cdn.example.com/v.mp4")],
            ..Default::default()
        }
    }

    #[test]
    fn image_only_post_is_rejected() {
        let content = PostContent {
            title: Some("Sunset".into()),
            media: vec![MediaItem::image("https://cdn.example.com/a.jpg")],
            ..Default::default()
        };
        assert!(matches!(
            YouTubeApi::validate_post(&content),
            Err(SocialError::Validation { .. })
        ));
    }

    #[test]
    fn title_rules() {
        assert!(YouTubeApi::validate_post(&video_content("My trip")).is_ok());
        assert!(YouTubeApi::validate_post(&video_content("")).is_err());
        assert!(YouTubeApi::validate_post(&video_content(&"t".repeat(101))).is_err());
        assert!(YouTubeApi::validate_post(&video_content("a <b> c")).is_err());
    }

    #[test]
    fn privacy_mapping() {
        assert_eq!(privacy_status(Privacy::Public), "public");
        assert_eq!(privacy_status(Privacy::Unlisted), "unlisted");
        assert_eq!(privacy_status(Privacy::Connections), "private");
    }

    #[test]
    fn scheduled_upload_is_private_with_publish_at() {
        let at = DateTime::parse_from_rfc3339("2030-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let content = video_content("Launch");
        let schedule = Scheduling {
            publish_at: at,
            timezone: "UTC".into(),
        };
        let metadata = YouTubeApi::metadata_for(&content, Privacy::Public, Some(&schedule), None);
        let json = serde_json::to_value(metadata.to_resource()).unwrap();
        assert_eq!(json["status"]["privacyStatus"], "private");
        assert_eq!(json["status"]["publishAt"], "2030-01-02T03:04:05Z");
        assert_eq!(json["snippet"]["categoryId"], "22");
    }

    #[test]
    fn statistics_parse_string_counts() {
        let stats: VideoStatistics = serde_json::from_value(serde_json::json!({
            "viewCount": "1500", "likeCount": "20"
        }))
        .unwrap();
        assert_eq!(stats.view_count, Some(1500));
        assert_eq!(stats.like_count, Some(20));
        assert_eq!(stats.comment_count, None);
    }
}
