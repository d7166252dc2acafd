// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! LinkedIn member sharing adapter (UGC Posts API).

use super::http::{
    char_len, check_response, check_response_json, network_error, open_media, query_string,
    token_response,
};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{
    AccountProfile, ArticleLink, MediaItem, MediaType, Platform, PollSpec, PostContent, Privacy,
    TokenValidation, Tokens,
};
use serde::{Deserialize, Serialize};

const PLATFORM: Platform = Platform::Linkedin;

pub const MAX_TEXT_CHARS: usize = 3_000;
pub const MAX_POLL_QUESTION_CHARS: usize = 140;
const POLL_OPTIONS: std::ops::RangeInclusive<usize> = 2..=4;
/// Version header required by the `/rest` API family.
const REST_API_VERSION: &str = "202401";
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// LinkedIn API client.
#[derive(Clone)]
pub struct LinkedInApi {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
    creds: PlatformCredentials,
}

impl LinkedInApi {
    pub const SCOPES: &'static [&'static str] = &["r_liteprofile", "r_emailaddress", "w_member_social"];

    pub fn new(creds: PlatformCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://api.linkedin.com".to_string(),
            oauth_base: "https://www.linkedin.com/oauth/v2".to_string(),
            creds,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_oauth_base(mut self, base: impl Into<String>) -> Self {
        self.oauth_base = base.into().trim_end_matches('/').to_string();
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    pub fn get_auth_url(&self, state: Option<&str>) -> String {
        let scope = Self::SCOPES.join(" ");
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.creds.client_id.as_str()),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
            ("scope", scope.as_str()),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        format!("{}/authorization?{}", self.oauth_base, query_string(&params))
    }

    /// LinkedIn issues no refresh token to standard apps; tokens last ~60 days.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Tokens, SocialError> {
        let response = self
            .http
            .post(format!("{}/accessToken", self.oauth_base))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.creds.redirect_uri.as_str()),
                ("client_id", self.creds.client_id.as_str()),
                ("client_secret", self.creds.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SocialError::oauth(PLATFORM, format!("Token exchange failed: {}", e)))?;

        let token: LinkedInTokenResponse = token_response(PLATFORM, response).await?;
        let scopes = match token.scope.as_deref() {
            Some(raw) => Tokens::parse_scopes(Some(raw)),
            None => Self::SCOPES.iter().map(|s| s.to_string()).collect(),
        };
        Ok(Tokens {
            access_token: token.access_token,
            refresh_token: None,
            expires_at: Tokens::expiry_from_now(token.expires_in),
            scopes,
            user_id: None,
        })
    }

    /// Profile lookup; an auth rejection means the token is no longer valid.
    pub async fn validate_token(&self, access_token: &str) -> Result<TokenValidation, SocialError> {
        match self.get_profile(access_token).await {
            Ok(_) => Ok(TokenValidation {
                is_valid: true,
                ..Default::default()
            }),
            Err(e) if e.is_auth_error() => Ok(TokenValidation::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn get_profile(&self, access_token: &str) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/v2/me", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let me: LinkedInMe = check_response_json(PLATFORM, response).await?;
        let display_name = [me.localized_first_name, me.localized_last_name]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Ok(AccountProfile {
            id: me.id,
            username: None,
            display_name: (!display_name.is_empty()).then_some(display_name),
            avatar_url: None,
        })
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    pub fn validate_post(
        content: &PostContent,
        privacy: Privacy,
        article: Option<&ArticleLink>,
        poll: Option<&PollSpec>,
    ) -> Result<(), SocialError> {
        visibility_for(privacy)?;

        let videos = content
            .media
            .iter()
            .filter(|m| m.media_type == MediaType::Video)
            .count();
        if videos > 1 || (videos == 1 && content.media.len() > 1) {
            return Err(SocialError::validation(
                PLATFORM,
                "a share carries either one video or images, not both",
            ));
        }
        let shapes = [poll.is_some(), article.is_some(), !content.media.is_empty()]
            .into_iter()
            .filter(|present| *present)
            .count();
        if shapes > 1 {
            return Err(SocialError::validation(
                PLATFORM,
                "only one content shape (poll, article, video or images) per share",
            ));
        }

        let text = content.text_with_hashtags();
        if char_len(&text) > MAX_TEXT_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("post text exceeds {} characters", MAX_TEXT_CHARS),
            ));
        }
        if text.trim().is_empty() && content.media.is_empty() && poll.is_none() && article.is_none()
        {
            return Err(SocialError::validation(PLATFORM, "post is empty"));
        }

        if let Some(poll) = poll {
            if !POLL_OPTIONS.contains(&poll.options.len()) {
                return Err(SocialError::validation(
                    PLATFORM,
                    "polls need between 2 and 4 options",
                ));
            }
            let question_len = char_len(poll.question.trim());
            if question_len == 0 || question_len > MAX_POLL_QUESTION_CHARS {
                return Err(SocialError::validation(
                    PLATFORM,
                    format!("poll question must be 1-{} characters", MAX_POLL_QUESTION_CHARS),
                ));
            }
        }

        Ok(())
    }

    /// Publish a member share: uploads media assets first, then creates the
    /// UGC post. Polls go through the versioned posts API instead.
    pub async fn publish(
        &self,
        author_id: &str,
        access_token: &str,
        content: &PostContent,
        privacy: Privacy,
        article: Option<&ArticleLink>,
        poll: Option<&PollSpec>,
    ) -> Result<String, SocialError> {
        Self::validate_post(content, privacy, article, poll)?;
        let author = author_urn(author_id);
        let text = content.text_with_hashtags();

        if let Some(poll) = poll {
            return self
                .create_poll(&author, access_token, &text, poll, privacy)
                .await;
        }

        let body = if let Some(article) = article {
            LinkedInContent::Article(article.clone())
        } else if let Some(video) = content.first_video() {
            let asset = self
                .upload_media_item(&author, access_token, video)
                .await?;
            LinkedInContent::Video(asset)
        } else if !content.media.is_empty() {
            let mut assets = Vec::with_capacity(content.media.len());
            for item in &content.media {
                assets.push(self.upload_media_item(&author, access_token, item).await?);
            }
            LinkedInContent::Images(assets)
        } else {
            LinkedInContent::Text
        };

        self.create_post(&author, access_token, &text, &body, privacy)
            .await
    }

    /// `POST /v2/ugcPosts`. Returns the share URN.
    pub async fn create_post(
        &self,
        author: &str,
        access_token: &str,
        text: &str,
        body: &LinkedInContent,
        privacy: Privacy,
    ) -> Result<String, SocialError> {
        let request = UgcPostRequest::new(author, text, body, visibility_for(privacy)?);
        let response = self
            .http
            .post(format!("{}/v2/ugcPosts", self.api_base))
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let id = created_id(response).await?;
        tracing::info!(post_id = %id, category = ?get_media_category(body), "LinkedIn post created");
        Ok(id)
    }

    /// Native poll through `/rest/posts`.
    pub async fn create_poll(
        &self,
        author: &str,
        access_token: &str,
        commentary: &str,
        poll: &PollSpec,
        privacy: Privacy,
    ) -> Result<String, SocialError> {
        let request = serde_json::json!({
            "author": author,
            "commentary": commentary,
            "visibility": visibility_for(privacy)?,
            "distribution": {
                "feedDistribution": "MAIN_FEED",
                "targetEntities": [],
                "thirdPartyDistributionChannels": [],
            },
            "lifecycleState": "PUBLISHED",
            "isReshareDisabledByAuthor": false,
            "content": {
                "poll": {
                    "question": poll.question,
                    "options": poll.options.iter().map(|o| serde_json::json!({ "text": o })).collect::<Vec<_>>(),
                    "settings": { "duration": poll_duration(poll.duration_days) },
                }
            }
        });

        let response = self
            .http
            .post(format!("{}/rest/posts", self.api_base))
            .bearer_auth(access_token)
            .header("LinkedIn-Version", REST_API_VERSION)
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let id = created_id(response).await?;
        tracing::info!(post_id = %id, "LinkedIn poll created");
        Ok(id)
    }

    async fn upload_media_item(
        &self,
        author: &str,
        access_token: &str,
        item: &MediaItem,
    ) -> Result<UploadedAsset, SocialError> {
        let media = open_media(&self.http, PLATFORM, &item.url).await?;
        let registered = self
            .register_upload(author, access_token, item.media_type)
            .await?;
        let (body, len) = media.into_sized_body().await?;
        registered.upload(access_token, body, len).await
    }

    /// Step one of an asset upload: obtain an upload URL and asset URN.
    pub async fn register_upload(
        &self,
        owner: &str,
        access_token: &str,
        media_type: MediaType,
    ) -> Result<RegisteredUpload, SocialError> {
        let recipe = match media_type {
            MediaType::Image => "urn:li:digitalmediaRecipe:feedshare-image",
            MediaType::Video => "urn:li:digitalmediaRecipe:feedshare-video",
        };
        let request = serde_json::json!({
            "registerUploadRequest": {
                "recipes": [recipe],
                "owner": owner,
                "serviceRelationships": [{
                    "relationshipType": "OWNER",
                    "identifier": "urn:li:userGeneratedContent",
                }],
            }
        });

        let response = self
            .http
            .post(format!("{}/v2/assets", self.api_base))
            .bearer_auth(access_token)
            .query(&[("action", "registerUpload")])
            .json(&request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let registered: RegisterUploadResponse = check_response_json(PLATFORM, response).await?;
        Ok(RegisteredUpload {
            http: self.http.clone(),
            upload_url: registered.value.upload_mechanism.http_request.upload_url,
            asset: registered.value.asset,
            media_type,
        })
    }

    // ─── Analytics ───────────────────────────────────────────────────────────

    /// Likes and comments on a share.
    pub async fn get_social_actions(
        &self,
        access_token: &str,
        post_urn: &str,
    ) -> Result<SocialActions, SocialError> {
        let response = self
            .http
            .get(format!(
                "{}/v2/socialActions/{}",
                self.api_base,
                urlencoding::encode(post_urn)
            ))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let actions: SocialActionsResponse = check_response_json(PLATFORM, response).await?;
        Ok(SocialActions {
            likes: actions.likes_summary.and_then(|s| s.total_likes),
            comments: actions
                .comments_summary
                .and_then(|s| s.aggregated_total_comments),
        })
    }
}

/// Accept a bare member id or a full URN.
pub fn author_urn(author_id: &str) -> String {
    if author_id.starts_with("urn:li:") {
        author_id.to_string()
    } else {
        format!("urn:li:person:{}", author_id)
    }
}

/// `MemberNetworkVisibility` for a canonical privacy setting.
pub fn visibility_for(privacy: Privacy) -> Result<&'static str, SocialError> {
    match privacy {
        Privacy::Public => Ok("PUBLIC"),
        Privacy::Connections => Ok("CONNECTIONS"),
        Privacy::Private | Privacy::Unlisted => Err(SocialError::validation(
            PLATFORM,
            format!("'{}' visibility is not available for member shares", privacy),
        )),
    }
}

fn poll_duration(days: u32) -> &'static str {
    match days {
        0..=1 => "ONE_DAY",
        2..=3 => "THREE_DAYS",
        4..=7 => "SEVEN_DAYS",
        _ => "FOURTEEN_DAYS",
    }
}

/// New entities come back in `x-restli-id`; some endpoints also echo `id`.
async fn created_id(response: reqwest::Response) -> Result<String, SocialError> {
    let response = check_response(PLATFORM, response).await?;
    let header_id = response
        .headers()
        .get("x-restli-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body: Option<CreatedEntity> = response.json().await.ok();
    header_id
        .or(body.and_then(|b| b.id))
        .ok_or_else(|| SocialError::parse(PLATFORM, "create response carried no id"))
}

/// What a share carries besides its commentary. Exactly one shape per post.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkedInContent {
    Text,
    Article(ArticleLink),
    Images(Vec<UploadedAsset>),
    Video(UploadedAsset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareMediaCategory {
    None,
    Article,
    Image,
    Video,
}

pub fn get_media_category(content: &LinkedInContent) -> ShareMediaCategory {
    match content {
        LinkedInContent::Text => ShareMediaCategory::None,
        LinkedInContent::Article(_) => ShareMediaCategory::Article,
        LinkedInContent::Images(_) => ShareMediaCategory::Image,
        LinkedInContent::Video(_) => ShareMediaCategory::Video,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UgcPostRequest {
    author: String,
    lifecycle_state: &'static str,
    specific_content: SpecificContent,
    visibility: Visibility,
}

impl UgcPostRequest {
    fn new(author: &str, text: &str, body: &LinkedInContent, visibility: &'static str) -> Self {
        let media = match body {
            LinkedInContent::Text => Vec::new(),
            LinkedInContent::Article(article) => vec![UgcMedia {
                status: "READY",
                original_url: Some(article.url.clone()),
                media: None,
                title: article.title.clone().map(|text| UgcText { text }),
                description: article.description.clone().map(|text| UgcText { text }),
            }],
            LinkedInContent::Images(assets) => assets.iter().map(UgcMedia::asset).collect(),
            LinkedInContent::Video(asset) => vec![UgcMedia::asset(asset)],
        };

        Self {
            author: author.to_string(),
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: UgcText {
                        text: text.to_string(),
                    },
                    share_media_category: get_media_category(body),
                    media,
                },
            },
            visibility: Visibility {
                member_network_visibility: visibility,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent {
    share_commentary: UgcText,
    share_media_category: ShareMediaCategory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media: Vec<UgcMedia>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UgcMedia {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<UgcText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<UgcText>,
}

impl UgcMedia {
    fn asset(asset: &UploadedAsset) -> Self {
        Self {
            status: "READY",
            original_url: None,
            media: Some(asset.urn.clone()),
            title: None,
            description: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct UgcText {
    text: String,
}

#[derive(Debug, Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: &'static str,
}

/// An upload slot from `registerUpload`. Only obtainable from
/// [`LinkedInApi::register_upload`].
#[derive(Debug)]
pub struct RegisteredUpload {
    http: reqwest::Client,
    upload_url: String,
    asset: String,
    media_type: MediaType,
}

impl RegisteredUpload {
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Step two: PUT the bytes. The asset URN is then usable in a post.
    pub async fn upload(
        self,
        access_token: &str,
        body: impl Into<reqwest::Body>,
        content_length: u64,
    ) -> Result<UploadedAsset, SocialError> {
        let response = self
            .http
            .put(&self.upload_url)
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, content_length)
            .body(body)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;
        check_response(PLATFORM, response).await?;

        tracing::debug!(asset = %self.asset, media_type = ?self.media_type, "LinkedIn asset uploaded");
        Ok(UploadedAsset { urn: self.asset })
    }
}

/// A digital media asset whose bytes have been uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub urn: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocialActions {
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RegisterUploadResponse {
    value: RegisterUploadValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUploadValue {
    upload_mechanism: UploadMechanism,
    asset: String,
}

#[derive(Debug, Deserialize)]
struct UploadMechanism {
    #[serde(rename = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest")]
    http_request: UploadHttpRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadHttpRequest {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEntity {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialActionsResponse {
    #[serde(default)]
    likes_summary: Option<LikesSummary>,
    #[serde(default)]
    comments_summary: Option<CommentsSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikesSummary {
    #[serde(default)]
    total_likes: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsSummary {
    #[serde(default)]
    aggregated_total_comments: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedInMe {
    id: String,
    #[serde(default)]
    localized_first_name: Option<String>,
    #[serde(default)]
    localized_last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkedInTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_urn_normalization() {
        assert_eq!(author_urn("abc123"), "urn:li:person:abc123");
        assert_eq!(
            author_urn("urn:li:organization:42"),
            "urn:li:organization:42"
        );
    }

    #[test]
    fn visibility_mapping() {
        assert_eq!(visibility_for(Privacy::Public).unwrap(), "PUBLIC");
        assert_eq!(visibility_for(Privacy::Connections).unwrap(), "CONNECTIONS");
        assert!(visibility_for(Privacy::Unlisted).is_err());
    }

    #[test]
    fn media_category_follows_content_shape() {
        let asset = UploadedAsset {
            urn: "urn:li:digitalmediaAsset:1".into(),
        };
        assert_eq!(get_media_category(&LinkedInContent::Text), ShareMediaCategory::None);
        assert_eq!(
            get_media_category(&LinkedInContent::Video(asset.clone())),
            ShareMediaCategory::Video
        );
        assert_eq!(
            get_media_category(&LinkedInContent::Images(vec![asset])),
            ShareMediaCategory::Image
        );
    }

    #[test]
    fn ugc_request_shape() {
        let article = ArticleLink {
            url: "https://example.com/post".into(),
            title: Some("Read me".into()),
            description: None,
        };
        let req = UgcPostRequest::new(
            "urn:li:person:1",
            "hello",
            &LinkedInContent::Article(article),
            "PUBLIC",
        );
        let json = serde_json::to_value(req).unwrap();
        let share = &json["specificContent"]["com.linkedin.ugc.ShareContent"];
        assert_eq!(json["lifecycleState"], "PUBLISHED");
        assert_eq!(share["shareMediaCategory"], "ARTICLE");
        assert_eq!(share["media"][0]["originalUrl"], "https://example.com/post");
        assert_eq!(
            json["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "PUBLIC"
        );
    }

    #[test]
    fn poll_validation() {
        let content = PostContent::text("Vote!");
        let mut poll = PollSpec {
            question: "Tabs or spaces?".into(),
            options: vec!["Tabs".into()],
            duration_days: 7,
        };
        assert!(LinkedInApi::validate_post(&content, Privacy::Public, None, Some(&poll)).is_err());
        poll.options.push("Spaces".into());
        assert!(LinkedInApi::validate_post(&content, Privacy::Public, None, Some(&poll)).is_ok());
        poll.question = "q".repeat(141);
        assert!(LinkedInApi::validate_post(&content, Privacy::Public, None, Some(&poll)).is_err());
    }

    #[test]
    fn text_limit() {
        let content = PostContent::text("x".repeat(3_001));
        assert!(LinkedInApi::validate_post(&content, Privacy::Public, None, None).is_err());
    }

    #[test]
    fn one_content_shape_per_share() {
        let poll = PollSpec {
            question: "Ship it?".into(),
            options: vec!["Yes".into(), "No".into()],
            duration_days: 1,
        };
        let article = ArticleLink {
            url: "https://example.com/launch".into(),
            title: None,
            description: None,
        };
        let video_and_image = PostContent {
            text: Some("Launch day".into()),
            media: vec![
                MediaItem::video("https://cdn.example/launch.mp4"),
                MediaItem::image("https://cdn.example/launch.jpg"),
            ],
            ..Default::default()
        };
        let images = PostContent {
            text: Some("Launch day".into()),
            media: vec![
                MediaItem::image("https://cdn.example/a.jpg"),
                MediaItem::image("https://cdn.example/b.jpg"),
            ],
            ..Default::default()
        };

        let err = LinkedInApi::validate_post(&video_and_image, Privacy::Public, None, Some(&poll))
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation { .. }));
        assert!(LinkedInApi::validate_post(&video_and_image, Privacy::Public, None, None).is_err());
        assert!(LinkedInApi::validate_post(&images, Privacy::Public, Some(&article), None).is_err());
        assert!(LinkedInApi::validate_post(&images, Privacy::Public, None, Some(&poll)).is_err());

        assert!(LinkedInApi::validate_post(&images, Privacy::Public, None, None).is_ok());
        let text = PostContent::text("Read this");
        assert!(LinkedInApi::validate_post(&text, Privacy::Public, Some(&article), None).is_ok());
    }
}
