// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! `SocialMediaManager`: one facade over the six platform adapters.
//!
//! Dispatches canonical requests to the right adapter and turns adapter
//! errors into per-platform results. Operations over several platforms run
//! concurrently and a failure on one never cancels the others.
//!
//! Publishing is at-most-once: nothing here retries a publish.

use crate::config::SocialConfig;
use crate::error::SocialError;
use crate::models::{
    AccessTokens, AccountProfile, ConnectionStatus, Platform, Privacy, PublishResult,
    TokenValidation, Tokens, TrendingItem, TrendingResult, UnifiedAnalytics, UnifiedPost,
};
use crate::platforms::twitter::{TweetRequest, WORLDWIDE_WOEID};
use crate::platforms::{
    FacebookApi, InstagramApi, LinkedInApi, TikTokApi, TwitterApi, YouTubeApi,
};
use crate::services::normalize::{normalize_metrics, PlatformMetrics};
use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;

/// Region used for trend lookups that need one.
const TRENDING_REGION: &str = "US";

/// Authorization URLs for every platform plus the Twitter PKCE verifier the
/// caller must keep until the Twitter callback arrives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrls {
    pub urls: BTreeMap<Platform, String>,
    pub twitter_code_verifier: String,
}

/// Pre-built adapters, for callers (and tests) that configure base URLs.
pub struct Adapters {
    pub facebook: FacebookApi,
    pub instagram: InstagramApi,
    pub twitter: TwitterApi,
    pub youtube: YouTubeApi,
    pub linkedin: LinkedInApi,
    pub tiktok: TikTokApi,
}

impl Adapters {
    pub fn from_config(config: &SocialConfig) -> Self {
        Self {
            facebook: FacebookApi::new(config.facebook.clone()),
            instagram: InstagramApi::new(config.instagram.clone()),
            twitter: TwitterApi::new(config.twitter.clone(), config.twitter_bearer_token.clone()),
            youtube: YouTubeApi::new(config.youtube.clone(), config.youtube_api_key.clone()),
            linkedin: LinkedInApi::new(config.linkedin.clone()),
            tiktok: TikTokApi::new(config.tiktok.clone()),
        }
    }
}

/// Borrowed handle to one adapter, for platform-specific calls the facade
/// does not cover.
#[derive(Clone, Copy)]
pub enum PlatformApi<'a> {
    Facebook(&'a FacebookApi),
    Instagram(&'a InstagramApi),
    Twitter(&'a TwitterApi),
    Youtube(&'a YouTubeApi),
    Linkedin(&'a LinkedInApi),
    Tiktok(&'a TikTokApi),
}

/// What a successful publish produced.
struct Published {
    post_id: String,
    warnings: Vec<String>,
}

impl Published {
    fn id(post_id: String) -> Self {
        Self {
            post_id,
            warnings: Vec::new(),
        }
    }
}

pub struct SocialMediaManager {
    facebook: FacebookApi,
    instagram: InstagramApi,
    twitter: TwitterApi,
    youtube: YouTubeApi,
    linkedin: LinkedInApi,
    tiktok: TikTokApi,
}

impl SocialMediaManager {
    pub fn new(config: &SocialConfig) -> Self {
        Self::from_adapters(Adapters::from_config(config))
    }

    pub fn from_adapters(adapters: Adapters) -> Self {
        Self {
            facebook: adapters.facebook,
            instagram: adapters.instagram,
            twitter: adapters.twitter,
            youtube: adapters.youtube,
            linkedin: adapters.linkedin,
            tiktok: adapters.tiktok,
        }
    }

    pub fn get_api(&self, platform: Platform) -> PlatformApi<'_> {
        match platform {
            Platform::Facebook => PlatformApi::Facebook(&self.facebook),
            Platform::Instagram => PlatformApi::Instagram(&self.instagram),
            Platform::Twitter => PlatformApi::Twitter(&self.twitter),
            Platform::Youtube => PlatformApi::Youtube(&self.youtube),
            Platform::Linkedin => PlatformApi::Linkedin(&self.linkedin),
            Platform::Tiktok => PlatformApi::Tiktok(&self.tiktok),
        }
    }

    pub fn facebook(&self) -> &FacebookApi {
        &self.facebook
    }

    pub fn instagram(&self) -> &InstagramApi {
        &self.instagram
    }

    pub fn twitter(&self) -> &TwitterApi {
        &self.twitter
    }

    pub fn youtube(&self) -> &YouTubeApi {
        &self.youtube
    }

    pub fn linkedin(&self) -> &LinkedInApi {
        &self.linkedin
    }

    pub fn tiktok(&self) -> &TikTokApi {
        &self.tiktok
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Authorization URLs for all platforms. Instagram shares Facebook's
    /// login dialog, so its entry is the Facebook URL.
    pub fn get_auth_urls(&self, state: Option<&str>) -> Result<AuthUrls, SocialError> {
        let pkce = TwitterApi::generate_code_challenge()?;
        let facebook_url = self.facebook.get_auth_url(state);

        let urls = BTreeMap::from([
            (Platform::Instagram, facebook_url.clone()),
            (Platform::Facebook, facebook_url),
            (
                Platform::Twitter,
                self.twitter.get_auth_url(state, &pkce.code_challenge),
            ),
            (Platform::Youtube, self.youtube.get_auth_url(state)),
            (Platform::Linkedin, self.linkedin.get_auth_url(state)),
            (Platform::Tiktok, self.tiktok.get_auth_url(state)),
        ]);

        Ok(AuthUrls {
            urls,
            twitter_code_verifier: pkce.code_verifier,
        })
    }

    /// Authorization URL for one platform. Twitter needs the PKCE challenge
    /// whose verifier the caller has stored.
    pub fn get_auth_url(
        &self,
        platform: Platform,
        state: Option<&str>,
        code_challenge: Option<&str>,
    ) -> Result<String, SocialError> {
        Ok(match platform {
            Platform::Facebook => self.facebook.get_auth_url(state),
            Platform::Instagram => self.instagram.get_auth_url(state),
            Platform::Twitter => {
                let challenge = code_challenge.ok_or_else(|| {
                    SocialError::oauth(platform, "PKCE code challenge is required")
                })?;
                self.twitter.get_auth_url(state, challenge)
            }
            Platform::Youtube => self.youtube.get_auth_url(state),
            Platform::Linkedin => self.linkedin.get_auth_url(state),
            Platform::Tiktok => self.tiktok.get_auth_url(state),
        })
    }

    pub async fn exchange_code_for_token(
        &self,
        platform: Platform,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Tokens, SocialError> {
        let tokens = match platform {
            Platform::Facebook => self.facebook.exchange_code_for_token(code).await,
            Platform::Instagram => self.instagram.exchange_code_for_token(code).await,
            Platform::Twitter => {
                let verifier = code_verifier.filter(|v| !v.is_empty()).ok_or_else(|| {
                    SocialError::oauth(platform, "PKCE code verifier is required")
                })?;
                self.twitter.exchange_code_for_token(code, verifier).await
            }
            Platform::Youtube => self.youtube.exchange_code_for_token(code).await,
            Platform::Linkedin => self.linkedin.exchange_code_for_token(code).await,
            Platform::Tiktok => self.tiktok.exchange_code_for_token(code).await,
        }?;

        tracing::info!(
            %platform,
            expires_at = ?tokens.expires_at,
            has_refresh = tokens.refresh_token.is_some(),
            "Authorization code exchanged"
        );
        Ok(tokens)
    }

    /// Use a refresh grant. Facebook, Instagram and LinkedIn have none.
    pub async fn refresh_tokens(
        &self,
        platform: Platform,
        refresh_token: &str,
    ) -> Result<Tokens, SocialError> {
        match platform {
            Platform::Twitter => self.twitter.refresh_token(refresh_token).await,
            Platform::Youtube => self.youtube.refresh_token(refresh_token).await,
            Platform::Tiktok => self.tiktok.refresh_token(refresh_token).await,
            Platform::Facebook | Platform::Instagram | Platform::Linkedin => {
                Err(SocialError::unsupported(platform, "token refresh"))
            }
        }
    }

    pub async fn validate_token(
        &self,
        platform: Platform,
        access_token: &str,
    ) -> Result<TokenValidation, SocialError> {
        match platform {
            Platform::Facebook => self.facebook.validate_token(access_token).await,
            Platform::Instagram => self.instagram.validate_token(access_token).await,
            Platform::Twitter => self.twitter.validate_token(access_token).await,
            Platform::Youtube => self.youtube.validate_token(access_token).await,
            Platform::Linkedin => self.linkedin.validate_token(access_token).await,
            Platform::Tiktok => self.tiktok.validate_token(access_token).await,
        }
    }

    /// Profile of the connected account. Instagram profiles are keyed by
    /// business account id, which a bare token does not provide.
    pub async fn get_profile(
        &self,
        platform: Platform,
        access_token: &str,
    ) -> Result<AccountProfile, SocialError> {
        match platform {
            Platform::Facebook => self.facebook.get_profile(access_token).await,
            Platform::Instagram => Err(SocialError::unsupported(
                platform,
                "profile lookup without an account id",
            )),
            Platform::Twitter => self.twitter.get_me(access_token).await,
            Platform::Youtube => self.youtube.get_channel(access_token).await,
            Platform::Linkedin => self.linkedin.get_profile(access_token).await,
            Platform::Tiktok => self.tiktok.get_user_info(access_token).await,
        }
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    /// Publish one post. Never fails: every problem ends up in the result.
    pub async fn publish_post(&self, post: &UnifiedPost, tokens: &AccessTokens) -> PublishResult {
        let platform = post.platform;
        match self.try_publish(post, tokens).await {
            Ok(published) => {
                tracing::info!(%platform, post_id = %published.post_id, warnings = published.warnings.len(), "Post published");
                PublishResult::published(platform, published.post_id, published.warnings)
            }
            Err(e) => {
                tracing::warn!(%platform, error = %e, "Publish failed");
                PublishResult::failed(platform, e.to_string())
            }
        }
    }

    /// Publish several posts concurrently. Results are in input order.
    pub async fn publish_posts(
        &self,
        posts: &[UnifiedPost],
        tokens: &AccessTokens,
    ) -> Vec<PublishResult> {
        join_all(posts.iter().map(|post| self.publish_post(post, tokens))).await
    }

    async fn try_publish(
        &self,
        post: &UnifiedPost,
        tokens: &AccessTokens,
    ) -> Result<Published, SocialError> {
        let platform = post.platform;
        let token = access_token(tokens, platform)?;
        let content = &post.content;
        let specific = &post.platform_specific;
        let scheduling = post.scheduling.as_ref();

        if scheduling.is_some() && !platform.supports_scheduling() {
            return Err(SocialError::unsupported(platform, "scheduled publishing"));
        }

        match platform {
            Platform::Facebook => {
                let page_id = required(platform, specific.page_id.as_deref(), "pageId")?;
                FacebookApi::validate_post(content, post.privacy, scheduling)?;
                let link = specific.article.as_ref().map(|a| a.url.as_str());
                let outcome = self
                    .facebook
                    .publish(page_id, token, content, scheduling, link)
                    .await?;
                Ok(Published {
                    post_id: outcome.post_id,
                    warnings: outcome
                        .skipped_media
                        .into_iter()
                        .map(|m| format!("media skipped: {}", m))
                        .collect(),
                })
            }
            Platform::Instagram => {
                let account_id = required(
                    platform,
                    specific.instagram_account_id.as_deref(),
                    "instagramAccountId",
                )?;
                InstagramApi::validate_post(content, post.privacy)?;
                let published = self
                    .instagram
                    .create_post(
                        account_id,
                        token,
                        &content.text_with_hashtags(),
                        &content.media,
                    )
                    .await?;
                Ok(Published::id(published.id))
            }
            Platform::Twitter => {
                if !content.media.is_empty() {
                    return Err(SocialError::unsupported(platform, "media attachments"));
                }
                if post.privacy != Privacy::Public {
                    return Err(SocialError::validation(
                        platform,
                        format!("tweets are public; '{}' is not supported", post.privacy),
                    ));
                }

                let first = content.text_with_hashtags();
                if specific.thread.is_empty() {
                    let request = TweetRequest::text(first);
                    let tweet = self.twitter.create_tweet(token, &request).await?;
                    return Ok(Published::id(tweet.id));
                }

                let texts: Vec<String> = std::iter::once(first)
                    .chain(specific.thread.iter().cloned())
                    .collect();
                let tweets = self.twitter.create_thread(token, &texts).await?;
                let head = tweets
                    .into_iter()
                    .next()
                    .ok_or_else(|| SocialError::parse(platform, "thread returned no tweets"))?;
                Ok(Published::id(head.id))
            }
            Platform::Youtube => {
                let outcome = self
                    .youtube
                    .publish(
                        token,
                        content,
                        post.privacy,
                        scheduling,
                        specific.category_id.as_deref(),
                        specific.playlist_id.as_deref(),
                    )
                    .await?;
                Ok(Published {
                    post_id: outcome.video.id,
                    warnings: outcome.warnings,
                })
            }
            Platform::Linkedin => {
                let author_id = required(platform, specific.author_id.as_deref(), "authorId")?;
                let id = self
                    .linkedin
                    .publish(
                        author_id,
                        token,
                        content,
                        post.privacy,
                        specific.article.as_ref(),
                        specific.poll.as_ref(),
                    )
                    .await?;
                Ok(Published::id(id))
            }
            Platform::Tiktok => {
                let ticket = self
                    .tiktok
                    .publish(token, content, post.privacy, specific)
                    .await?;
                Ok(Published::id(ticket.publish_id))
            }
        }
    }

    // ─── Analytics ───────────────────────────────────────────────────────────

    /// Normalized metrics for the given posts. Platforms without a token and
    /// posts whose lookup fails are logged and left out.
    pub async fn get_unified_analytics(
        &self,
        platforms: &[Platform],
        tokens: &AccessTokens,
        post_ids: &BTreeMap<Platform, Vec<String>>,
    ) -> Vec<UnifiedAnalytics> {
        let mut lookups = Vec::new();
        for &platform in platforms {
            let token = match access_token(tokens, platform) {
                Ok(token) => token,
                Err(_) => {
                    tracing::debug!(%platform, "No access token, skipping analytics");
                    continue;
                }
            };
            for post_id in post_ids.get(&platform).into_iter().flatten() {
                lookups.push(async move {
                    match self.fetch_metrics(platform, token, post_id).await {
                        Ok(raw) => Some(UnifiedAnalytics {
                            platform: raw.platform(),
                            post_id: post_id.clone(),
                            date: Utc::now(),
                            metrics: normalize_metrics(&raw),
                        }),
                        Err(e) => {
                            tracing::warn!(%platform, post_id = %post_id, error = %e, "Analytics lookup failed");
                            None
                        }
                    }
                });
            }
        }

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn fetch_metrics(
        &self,
        platform: Platform,
        token: &str,
        post_id: &str,
    ) -> Result<PlatformMetrics, SocialError> {
        Ok(match platform {
            Platform::Facebook => {
                PlatformMetrics::Facebook(self.facebook.get_post_insights(post_id, token).await?)
            }
            Platform::Instagram => {
                PlatformMetrics::Instagram(self.instagram.get_media_insights(post_id, token).await?)
            }
            Platform::Twitter => {
                PlatformMetrics::Twitter(self.twitter.get_tweet_metrics(token, post_id).await?)
            }
            Platform::Youtube => {
                PlatformMetrics::Youtube(self.youtube.get_video_statistics(token, post_id).await?)
            }
            Platform::Linkedin => {
                PlatformMetrics::Linkedin(self.linkedin.get_social_actions(token, post_id).await?)
            }
            Platform::Tiktok => {
                let video = self
                    .tiktok
                    .query_videos(token, &[post_id.to_string()])
                    .await?
                    .into_iter()
                    .find(|v| v.id == post_id)
                    .ok_or_else(|| SocialError::Upstream {
                        platform,
                        status: 404,
                        message: format!("video {} not found", post_id),
                    })?;
                PlatformMetrics::Tiktok(video)
            }
        })
    }

    // ─── Trends ──────────────────────────────────────────────────────────────

    /// Trending content per platform. Platforms without a trends API report
    /// `NotAvailable` rather than an empty list.
    pub async fn get_trending_content(
        &self,
        platforms: &[Platform],
        tokens: &AccessTokens,
    ) -> BTreeMap<Platform, TrendingResult> {
        let lookups = platforms.iter().map(|&platform| async move {
            let result = match platform {
                Platform::Facebook | Platform::Instagram | Platform::Linkedin => {
                    TrendingResult::NotAvailable
                }
                Platform::Twitter => {
                    trending_result(self.twitter.get_trending(WORLDWIDE_WOEID).await)
                }
                Platform::Youtube => {
                    let token = access_token(tokens, platform).ok();
                    trending_result(self.youtube.get_trending(token, TRENDING_REGION).await)
                }
                Platform::Tiktok => {
                    trending_result(self.tiktok.get_trending_hashtags(TRENDING_REGION).await)
                }
            };
            (platform, result)
        });

        join_all(lookups).await.into_iter().collect()
    }

    // ─── Connections ─────────────────────────────────────────────────────────

    /// Health of every supplied credential, one entry per platform.
    pub async fn check_connection_status(&self, tokens: &AccessTokens) -> Vec<ConnectionStatus> {
        join_all(
            tokens
                .iter()
                .map(|(&platform, token)| self.connection_status(platform, token)),
        )
        .await
    }

    async fn connection_status(&self, platform: Platform, token: &str) -> ConnectionStatus {
        if token.trim().is_empty() {
            return ConnectionStatus::disconnected(platform, "No access token");
        }

        let validation = match self.validate_token(platform, token).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(%platform, error = %e, "Token validation failed");
                return ConnectionStatus::disconnected(platform, e.to_string());
            }
        };
        if !validation.is_valid {
            return ConnectionStatus::disconnected(platform, "Access token is invalid or expired");
        }

        let profile = match self.get_profile(platform, token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::debug!(%platform, error = %e, "Profile lookup failed");
                None
            }
        };

        ConnectionStatus {
            platform,
            connected: true,
            username: profile.as_ref().and_then(|p| p.username.clone()),
            display_name: profile.as_ref().and_then(|p| p.display_name.clone()),
            avatar_url: profile.and_then(|p| p.avatar_url),
            expires_at: validation.expires_at,
            scopes: validation.scopes,
            error: None,
        }
    }
}

fn access_token(tokens: &AccessTokens, platform: Platform) -> Result<&str, SocialError> {
    tokens
        .get(&platform)
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| SocialError::Auth {
            platform,
            message: "No access token".to_string(),
        })
}

fn required<'a>(
    platform: Platform,
    value: Option<&'a str>,
    name: &str,
) -> Result<&'a str, SocialError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SocialError::validation(platform, format!("{} is required", name)))
}

fn trending_result(
    result: Result<Vec<TrendingItem>, SocialError>,
) -> TrendingResult {
    match result {
        Ok(items) => TrendingResult::Available { items },
        Err(SocialError::Unsupported { platform, operation }) => {
            tracing::debug!(%platform, operation, "Trends not available");
            TrendingResult::NotAvailable
        }
        Err(e) => {
            tracing::warn!(platform = %e.platform(), error = %e, "Trend lookup failed");
            TrendingResult::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaItem, PostContent};

    fn manager() -> SocialMediaManager {
        SocialMediaManager::new(&SocialConfig::test_default())
    }

    #[test]
    fn instagram_entry_is_facebook_url() {
        let urls = manager().get_auth_urls(Some("s")).unwrap();
        assert_eq!(urls.urls.len(), 6);
        assert_eq!(urls.urls[&Platform::Instagram], urls.urls[&Platform::Facebook]);
        assert_eq!(urls.twitter_code_verifier.len(), 128);
    }

    #[test]
    fn twitter_auth_url_needs_challenge() {
        let err = manager()
            .get_auth_url(Platform::Twitter, None, None)
            .unwrap_err();
        assert!(matches!(err, SocialError::OAuth { .. }));
    }

    #[tokio::test]
    async fn twitter_exchange_without_verifier_fails_early() {
        let err = manager()
            .exchange_code_for_token(Platform::Twitter, "code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SocialError::OAuth { .. }));
    }

    #[tokio::test]
    async fn refresh_unsupported_without_grant() {
        for platform in [Platform::Facebook, Platform::Instagram, Platform::Linkedin] {
            let err = manager().refresh_tokens(platform, "r").await.unwrap_err();
            assert!(matches!(err, SocialError::Unsupported { .. }));
        }
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let post = UnifiedPost::new(Platform::Linkedin, PostContent::text("hi"));
        let result = manager().publish_post(&post, &AccessTokens::new()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("No access token"));
    }

    #[tokio::test]
    async fn missing_page_id_is_reported() {
        let post = UnifiedPost::new(Platform::Facebook, PostContent::text("hi"));
        let tokens = AccessTokens::from([(Platform::Facebook, "t".to_string())]);
        let result = manager().publish_post(&post, &tokens).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("pageId is required"));
    }

    #[tokio::test]
    async fn twitter_media_is_unsupported() {
        let mut content = PostContent::text("look");
        content.media.push(MediaItem::image("https://cdn.example.com/a.png"));
        let post = UnifiedPost::new(Platform::Twitter, content);
        let tokens = AccessTokens::from([(Platform::Twitter, "t".to_string())]);
        let result = manager().publish_post(&post, &tokens).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("media attachments"));
    }

    #[tokio::test]
    async fn platforms_without_trends_report_not_available() {
        let trends = manager()
            .get_trending_content(
                &[Platform::Facebook, Platform::Instagram, Platform::Linkedin],
                &AccessTokens::new(),
            )
            .await;
        assert_eq!(trends.len(), 3);
        assert!(trends.values().all(|t| *t == TrendingResult::NotAvailable));
    }
}
