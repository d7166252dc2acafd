// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! TikTok Content Posting API adapter (Open API v2).
//!
//! Publishing is three calls: `init_upload` reserves an upload slot,
//! `InitializedUpload::upload` PUTs the video in `Content-Range` chunks, and
//! `confirm` hands the video to TikTok. Processing finishes later; poll it
//! with `get_publish_status`.

use super::http::{
    check_response, check_response_json, network_error, open_media, query_string, token_response,
    ChunkReader,
};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{
    AccountProfile, MediaType, Platform, PlatformSpecific, PostContent, Privacy, TokenValidation,
    Tokens, TrendingItem,
};
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PLATFORM: Platform = Platform::Tiktok;

pub const MAX_TITLE_CHARS: usize = 2_200;
/// Preferred chunk size.
pub const CHUNK_SIZE: u64 = 10_000_000;
/// Below this a file must be sent as a single chunk.
pub const MIN_CHUNK_SIZE: u64 = 5_000_000;
pub const MAX_VIDEO_BYTES: u64 = 4 * 1024 * 1024 * 1024;
const TRENDING_LOOKBACK_DAYS: i64 = 7;
const TRENDING_LIMIT: usize = 20;

/// TikTok Open API client.
#[derive(Clone)]
pub struct TikTokApi {
    http: reqwest::Client,
    api_base: String,
    authorize_url: String,
    creds: PlatformCredentials,
}

impl TikTokApi {
    pub const SCOPES: &'static [&'static str] =
        &["user.info.basic", "video.upload", "video.publish", "video.list"];

    /// `creds.client_id` holds TikTok's client key.
    pub fn new(creds: PlatformCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://open.tiktokapis.com".to_string(),
            authorize_url: "https://www.tiktok.com/v2/auth/authorize/".to_string(),
            creds,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    pub fn get_auth_url(&self, state: Option<&str>) -> String {
        let scope = Self::SCOPES.join(",");
        let mut params = vec![
            ("client_key", self.creds.client_id.as_str()),
            ("scope", scope.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        format!("{}?{}", self.authorize_url, query_string(&params))
    }

    /// The returned tokens carry the user's `open_id` in `user_id`.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Tokens, SocialError> {
        self.token_request(&[
            ("client_key", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
        ])
        .await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens, SocialError> {
        self.token_request(&[
            ("client_key", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Tokens, SocialError> {
        let response = self
            .http
            .post(format!("{}/v2/oauth/token/", self.api_base))
            .form(form)
            .send()
            .await
            .map_err(|e| SocialError::oauth(PLATFORM, format!("Token request failed: {}", e)))?;

        let token: TikTokTokenResponse = token_response(PLATFORM, response).await?;
        // Grant errors come back as 200 with an `error` field.
        let access_token = token.access_token.ok_or_else(|| {
            SocialError::oauth(
                PLATFORM,
                format!(
                    "{}: {}",
                    token.error.as_deref().unwrap_or("no access token"),
                    token.error_description.as_deref().unwrap_or_default()
                ),
            )
        })?;

        Ok(Tokens {
            access_token,
            refresh_token: token.refresh_token,
            expires_at: Tokens::expiry_from_now(token.expires_in),
            scopes: Tokens::parse_scopes(token.scope.as_deref()),
            user_id: token.open_id,
        })
    }

    pub async fn validate_token(&self, access_token: &str) -> Result<TokenValidation, SocialError> {
        match self.get_user_info(access_token).await {
            Ok(_) => Ok(TokenValidation {
                is_valid: true,
                ..Default::default()
            }),
            Err(e) if e.is_auth_error() => Ok(TokenValidation::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/v2/user/info/", self.api_base))
            .bearer_auth(access_token)
            .query(&[("fields", "open_id,avatar_url,display_name,username")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let data: UserInfoData = tiktok_data(response).await?;
        Ok(AccountProfile {
            id: data.user.open_id,
            username: data.user.username,
            display_name: data.user.display_name,
            avatar_url: data.user.avatar_url,
        })
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    pub fn validate_post(content: &PostContent) -> Result<(), SocialError> {
        match content.media.as_slice() {
            [item] if item.media_type == MediaType::Video => {}
            _ => {
                return Err(SocialError::validation(
                    PLATFORM,
                    "TikTok posts require exactly one video",
                ))
            }
        }
        if super::http::char_len(&post_title(content)) > MAX_TITLE_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("title exceeds {} characters", MAX_TITLE_CHARS),
            ));
        }
        Ok(())
    }

    /// Step one: reserve an upload slot for a file of the planned size.
    pub async fn init_upload(
        &self,
        access_token: &str,
        post_info: &PostInfo,
        plan: &ChunkPlan,
    ) -> Result<InitializedUpload, SocialError> {
        let request = InitRequest {
            post_info,
            source_info: SourceInfo {
                source: "FILE_UPLOAD",
                video_size: plan.video_size,
                chunk_size: plan.chunk_size,
                total_chunk_count: plan.total_chunk_count,
            },
        };

        let response = self
            .http
            .post(format!("{}/v2/post/publish/video/init/", self.api_base))
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let data: InitData = tiktok_data(response).await?;
        tracing::debug!(publish_id = %data.publish_id, chunks = plan.total_chunk_count, "TikTok upload initialized");
        Ok(InitializedUpload {
            http: self.http.clone(),
            publish_id: data.publish_id,
            upload_url: data.upload_url,
            plan: plan.clone(),
        })
    }

    /// Step three: hand the uploaded video over for publishing.
    pub async fn confirm(
        &self,
        access_token: &str,
        video: UploadedVideo,
    ) -> Result<PublishTicket, SocialError> {
        let response = self
            .http
            .post(format!("{}/v2/post/publish/", self.api_base))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "publish_id": video.publish_id }))
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        check_envelope(response).await?;
        tracing::info!(publish_id = %video.publish_id, "TikTok publish submitted");
        Ok(PublishTicket {
            publish_id: video.publish_id,
        })
    }

    /// Download the video and run all three steps.
    pub async fn publish(
        &self,
        access_token: &str,
        content: &PostContent,
        privacy: Privacy,
        options: &PlatformSpecific,
    ) -> Result<PublishTicket, SocialError> {
        Self::validate_post(content)?;
        let video_item = content
            .first_video()
            .ok_or_else(|| SocialError::validation(PLATFORM, "no video media item"))?;

        let post_info = PostInfo::new(content, privacy, options);
        let media = open_media(&self.http, PLATFORM, &video_item.url).await?;

        // Stream chunk by chunk when the size is known up front.
        let uploaded = match media.content_length() {
            Some(size) => {
                let plan = ChunkPlan::for_size(size)?;
                let slot = self.init_upload(access_token, &post_info, &plan).await?;
                slot.upload_chunks(media.into_chunks()).await?
            }
            None => {
                let bytes = media.bytes().await?;
                let plan = ChunkPlan::for_size(bytes.len() as u64)?;
                let slot = self.init_upload(access_token, &post_info, &plan).await?;
                slot.upload(&bytes).await?
            }
        };
        self.confirm(access_token, uploaded).await
    }

    /// Processing state of a submitted publish.
    pub async fn get_publish_status(
        &self,
        access_token: &str,
        publish_id: &str,
    ) -> Result<PublishStatus, SocialError> {
        let response = self
            .http
            .post(format!("{}/v2/post/publish/status/fetch/", self.api_base))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "publish_id": publish_id }))
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        tiktok_data(response).await
    }

    // ─── Analytics & discovery ───────────────────────────────────────────────

    pub async fn query_videos(
        &self,
        access_token: &str,
        video_ids: &[String],
    ) -> Result<Vec<TikTokVideo>, SocialError> {
        let response = self
            .http
            .post(format!("{}/v2/video/query/", self.api_base))
            .bearer_auth(access_token)
            .query(&[(
                "fields",
                "id,title,view_count,like_count,comment_count,share_count",
            )])
            .json(&serde_json::json!({ "filters": { "video_ids": video_ids } }))
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let data: VideoQueryData = tiktok_data(response).await?;
        Ok(data.videos)
    }

    /// Most used hashtags among last week's popular videos.
    ///
    /// Uses the Research API with an app (client credentials) token, so the
    /// app must have Research API access.
    pub async fn get_trending_hashtags(
        &self,
        region_code: &str,
    ) -> Result<Vec<TrendingItem>, SocialError> {
        let app_token = self.client_credentials_token().await?;
        let end = Utc::now().date_naive();
        let start = end - Duration::days(TRENDING_LOOKBACK_DAYS);

        let request = serde_json::json!({
            "query": {
                "and": [{
                    "operation": "IN",
                    "field_name": "region_code",
                    "field_values": [region_code],
                }]
            },
            "start_date": start.format("%Y%m%d").to_string(),
            "end_date": end.format("%Y%m%d").to_string(),
            "max_count": 100,
        });

        let response = self
            .http
            .post(format!("{}/v2/research/video/query/", self.api_base))
            .bearer_auth(app_token)
            .query(&[("fields", "id,hashtag_names,view_count")])
            .json(&request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let data: ResearchQueryData = tiktok_data(response).await?;
        Ok(aggregate_hashtags(&data.videos))
    }

    async fn client_credentials_token(&self) -> Result<String, SocialError> {
        let response = self
            .http
            .post(format!("{}/v2/oauth/token/", self.api_base))
            .form(&[
                ("client_key", self.creds.client_id.as_str()),
                ("client_secret", self.creds.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let token: TikTokTokenResponse = token_response(PLATFORM, response).await?;
        token
            .access_token
            .ok_or_else(|| SocialError::oauth(PLATFORM, "client credentials grant returned no token"))
    }
}

/// Vendor privacy level for a canonical setting.
pub fn privacy_level(privacy: Privacy) -> &'static str {
    match privacy {
        Privacy::Public => "PUBLIC_TO_EVERYONE",
        Privacy::Private => "SELF_ONLY",
        Privacy::Connections => "MUTUAL_FOLLOW_FRIENDS",
        Privacy::Unlisted => "FOLLOWER_OF_CREATOR",
    }
}

fn post_title(content: &PostContent) -> String {
    let caption = content.text_with_hashtags();
    if caption.is_empty() {
        content.title.clone().unwrap_or_default()
    } else {
        caption
    }
}

/// Hashtags ranked by the total views of the videos using them.
fn aggregate_hashtags(videos: &[ResearchVideo]) -> Vec<TrendingItem> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for video in videos {
        for tag in &video.hashtag_names {
            let tag = tag.trim().trim_start_matches('#').to_lowercase();
            if tag.is_empty() {
                continue;
            }
            *totals.entry(tag).or_default() += video.view_count.unwrap_or(0).max(1);
        }
    }

    let mut ranked: Vec<(String, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(TRENDING_LIMIT)
        .map(|(tag, volume)| TrendingItem {
            url: Some(format!("https://www.tiktok.com/tag/{}", urlencoding::encode(&tag))),
            name: format!("#{}", tag),
            volume: Some(volume),
        })
        .collect()
}

/// How a file is split for upload.
///
/// Files under [`MIN_CHUNK_SIZE`] (and up to one [`CHUNK_SIZE`]) go in one
/// chunk. Larger files use `floor(size / CHUNK_SIZE)` chunks and the last
/// chunk absorbs the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub video_size: u64,
    pub chunk_size: u64,
    pub total_chunk_count: u64,
}

impl ChunkPlan {
    pub fn for_size(video_size: u64) -> Result<Self, SocialError> {
        if video_size == 0 {
            return Err(SocialError::validation(PLATFORM, "video file is empty"));
        }
        if video_size > MAX_VIDEO_BYTES {
            return Err(SocialError::validation(PLATFORM, "video exceeds 4 GB"));
        }

        if video_size <= CHUNK_SIZE.max(MIN_CHUNK_SIZE) {
            return Ok(Self {
                video_size,
                chunk_size: video_size,
                total_chunk_count: 1,
            });
        }

        Ok(Self {
            video_size,
            chunk_size: CHUNK_SIZE,
            total_chunk_count: video_size / CHUNK_SIZE,
        })
    }

    /// Inclusive byte ranges, one per chunk.
    pub fn ranges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        (0..self.total_chunk_count).map(move |index| {
            let start = index * self.chunk_size;
            let end = if index + 1 == self.total_chunk_count {
                self.video_size - 1
            } else {
                start + self.chunk_size - 1
            };
            (start, end)
        })
    }
}

/// `post_info` sent with the init call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostInfo {
    pub title: String,
    pub privacy_level: &'static str,
    pub disable_duet: bool,
    pub disable_comment: bool,
    pub disable_stitch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_cover_timestamp_ms: Option<u64>,
}

impl PostInfo {
    pub fn new(content: &PostContent, privacy: Privacy, options: &PlatformSpecific) -> Self {
        Self {
            title: post_title(content),
            privacy_level: privacy_level(privacy),
            disable_duet: options.disable_duet.unwrap_or(false),
            disable_comment: options.disable_comment.unwrap_or(false),
            disable_stitch: options.disable_stitch.unwrap_or(false),
            video_cover_timestamp_ms: options.video_cover_timestamp_ms,
        }
    }
}

#[derive(Serialize)]
struct InitRequest<'a> {
    post_info: &'a PostInfo,
    source_info: SourceInfo,
}

#[derive(Serialize)]
struct SourceInfo {
    source: &'static str,
    video_size: u64,
    chunk_size: u64,
    total_chunk_count: u64,
}

/// An upload slot. Only obtainable from [`TikTokApi::init_upload`].
#[derive(Debug)]
pub struct InitializedUpload {
    http: reqwest::Client,
    publish_id: String,
    upload_url: String,
    plan: ChunkPlan,
}

impl InitializedUpload {
    pub fn publish_id(&self) -> &str {
        &self.publish_id
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Step two: PUT each chunk with its `Content-Range`. Consumes the slot.
    pub async fn upload(self, bytes: &[u8]) -> Result<UploadedVideo, SocialError> {
        if bytes.len() as u64 != self.plan.video_size {
            return Err(SocialError::validation(
                PLATFORM,
                "video size differs from the planned upload size",
            ));
        }

        for (start, end) in self.plan.ranges() {
            let chunk = bytes[start as usize..=end as usize].to_vec();
            self.put_chunk(start, end, chunk).await?;
        }

        Ok(UploadedVideo {
            publish_id: self.publish_id,
        })
    }

    /// Step two, reading each chunk from a download as it is needed.
    pub(crate) async fn upload_chunks(
        self,
        mut source: ChunkReader,
    ) -> Result<UploadedVideo, SocialError> {
        for (start, end) in self.plan.ranges() {
            let chunk = source.next_chunk((end - start + 1) as usize).await?;
            self.put_chunk(start, end, chunk).await?;
        }
        if source.has_remaining().await? {
            return Err(SocialError::validation(
                PLATFORM,
                "video size differs from the planned upload size",
            ));
        }

        Ok(UploadedVideo {
            publish_id: self.publish_id,
        })
    }

    async fn put_chunk(&self, start: u64, end: u64, chunk: Vec<u8>) -> Result<(), SocialError> {
        let response = self
            .http
            .put(&self.upload_url)
            .header("Content-Type", "video/mp4")
            .header(
                "Content-Range",
                format!("bytes {}-{}/{}", start, end, self.plan.video_size),
            )
            .body(chunk)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        check_response(PLATFORM, response).await?;
        Ok(())
    }
}

/// All chunks are on TikTok's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    publish_id: String,
}

impl UploadedVideo {
    pub fn publish_id(&self) -> &str {
        &self.publish_id
    }
}

/// Handle for polling an asynchronous publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishTicket {
    pub publish_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishState {
    ProcessingUpload,
    ProcessingDownload,
    SendToUserInbox,
    PublishComplete,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishStatus {
    pub status: PublishState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    /// Spelling as returned by TikTok.
    #[serde(
        default,
        rename = "publicaly_available_post_id",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub post_ids: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TikTokVideo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub share_count: Option<u64>,
}

/// Every response wraps its payload: `{"data": ..., "error": {"code": "ok"}}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

async fn tiktok_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SocialError> {
    let status = response.status().as_u16();
    let envelope: Envelope<T> = check_response_json(PLATFORM, response).await?;
    envelope_error(status, envelope.error)?;
    envelope
        .data
        .ok_or_else(|| SocialError::parse(PLATFORM, "response has no data"))
}

async fn check_envelope(response: reqwest::Response) -> Result<(), SocialError> {
    let status = response.status().as_u16();
    let envelope: Envelope<serde_json::Value> = check_response_json(PLATFORM, response).await?;
    envelope_error(status, envelope.error)
}

fn envelope_error(status: u16, error: Option<EnvelopeError>) -> Result<(), SocialError> {
    match error {
        Some(e) if !e.code.is_empty() && e.code != "ok" => {
            if e.code == "access_token_invalid" {
                return Err(SocialError::Auth {
                    platform: PLATFORM,
                    message: e.message,
                });
            }
            if e.code == "rate_limit_exceeded" {
                return Err(SocialError::RateLimit {
                    platform: PLATFORM,
                    retry_after: None,
                });
            }
            Err(SocialError::Upstream {
                platform: PLATFORM,
                status,
                message: format!("{}: {}", e.code, e.message),
            })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct InitData {
    publish_id: String,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    user: TikTokUser,
}

#[derive(Debug, Deserialize)]
struct TikTokUser {
    open_id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoQueryData {
    #[serde(default)]
    videos: Vec<TikTokVideo>,
}

#[derive(Debug, Deserialize)]
struct ResearchQueryData {
    #[serde(default)]
    videos: Vec<ResearchVideo>,
}

#[derive(Debug, Deserialize)]
struct ResearchVideo {
    #[serde(default)]
    hashtag_names: Vec<String>,
    #[serde(default)]
    view_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TikTokTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    open_id: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
