// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Twitter/X API v2 adapter.
//!
//! Handles:
//! - OAuth 2.0 authorization code flow with mandatory PKCE
//! - Single tweets and reply-chained threads
//! - Public metrics, trends and recent search (app bearer token)

use super::http::{char_len, check_response_json, network_error, query_string, token_response};
use super::pkce::{self, PkceChallenge};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{AccountProfile, Platform, TokenValidation, Tokens, TrendingItem};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PLATFORM: Platform = Platform::Twitter;

pub const MAX_TWEET_CHARS: usize = 280;
/// Pause between thread tweets. Posting faster gets replies rejected.
pub const THREAD_DELAY: Duration = Duration::from_secs(1);
/// Worldwide WOEID.
pub const WORLDWIDE_WOEID: u32 = 1;

/// Twitter API v2 client.
#[derive(Clone)]
pub struct TwitterApi {
    http: reqwest::Client,
    api_base: String,
    authorize_url: String,
    creds: PlatformCredentials,
    bearer_token: Option<String>,
}

impl TwitterApi {
    pub const SCOPES: &'static [&'static str] =
        &["tweet.read", "tweet.write", "users.read", "offline.access"];

    pub fn new(creds: PlatformCredentials, bearer_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://api.twitter.com/2".to_string(),
            authorize_url: "https://twitter.com/i/oauth2/authorize".to_string(),
            creds,
            bearer_token,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Generate a PKCE pair. The caller stores the verifier until the callback.
    pub fn generate_code_challenge() -> Result<PkceChallenge, SocialError> {
        pkce::generate_code_challenge().map_err(|e| SocialError::oauth(PLATFORM, e.to_string()))
    }

    pub fn get_auth_url(&self, state: Option<&str>, code_challenge: &str) -> String {
        let scope = Self::SCOPES.join(" ");
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.creds.client_id.as_str()),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", PkceChallenge::METHOD),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        format!("{}?{}", self.authorize_url, query_string(&params))
    }

    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<Tokens, SocialError> {
        if code_verifier.is_empty() {
            return Err(SocialError::oauth(PLATFORM, "PKCE code verifier is required"));
        }

        self.token_request(&[
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", self.creds.client_id.as_str()),
            ("redirect_uri", self.creds.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ])
        .await
    }

    /// Refresh an expired access token. Twitter rotates the refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens, SocialError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("client_id", self.creds.client_id.as_str()),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Tokens, SocialError> {
        let response = self
            .http
            .post(format!("{}/oauth2/token", self.api_base))
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| SocialError::oauth(PLATFORM, format!("Token request failed: {}", e)))?;

        let token: TwitterTokenResponse = token_response(PLATFORM, response).await?;
        Ok(Tokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Tokens::expiry_from_now(token.expires_in),
            scopes: Tokens::parse_scopes(token.scope.as_deref()),
            user_id: None,
        })
    }

    /// No introspection endpoint; a successful `/users/me` means valid.
    pub async fn validate_token(&self, access_token: &str) -> Result<TokenValidation, SocialError> {
        match self.get_me(access_token).await {
            Ok(_) => Ok(TokenValidation {
                is_valid: true,
                ..Default::default()
            }),
            Err(e) if e.is_auth_error() => Ok(TokenValidation::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn get_me(&self, access_token: &str) -> Result<AccountProfile, SocialError> {
        let response = self
            .http
            .get(format!("{}/users/me", self.api_base))
            .bearer_auth(access_token)
            .query(&[("user.fields", "profile_image_url,username,name")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let me: DataEnvelope<TwitterUser> = check_response_json(PLATFORM, response).await?;
        Ok(AccountProfile {
            id: me.data.id,
            username: Some(me.data.username),
            display_name: Some(me.data.name),
            avatar_url: me.data.profile_image_url,
        })
    }

    // ─── Publishing ──────────────────────────────────────────────────────────

    pub fn validate_tweet(text: &str) -> Result<(), SocialError> {
        if text.trim().is_empty() {
            return Err(SocialError::validation(PLATFORM, "tweet text is empty"));
        }
        let len = char_len(text);
        if len > MAX_TWEET_CHARS {
            return Err(SocialError::validation(
                PLATFORM,
                format!("tweet is {} characters; limit is {}", len, MAX_TWEET_CHARS),
            ));
        }
        Ok(())
    }

    pub async fn create_tweet(
        &self,
        access_token: &str,
        request: &TweetRequest,
    ) -> Result<PostedTweet, SocialError> {
        Self::validate_tweet(&request.text)?;

        let response = self
            .http
            .post(format!("{}/tweets", self.api_base))
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let created: DataEnvelope<PostedTweet> = check_response_json(PLATFORM, response).await?;
        tracing::info!(tweet_id = %created.data.id, reply = request.reply.is_some(), "Tweet posted");
        Ok(created.data)
    }

    /// Post tweets as a reply chain: each tweet replies to the one before it.
    ///
    /// Strictly sequential; every step needs the id returned by the previous
    /// one. All texts are validated before the first call. On failure the
    /// already posted tweets stay up and the error is returned.
    pub async fn create_thread(
        &self,
        access_token: &str,
        texts: &[String],
    ) -> Result<Vec<PostedTweet>, SocialError> {
        if texts.is_empty() {
            return Err(SocialError::validation(PLATFORM, "thread has no tweets"));
        }
        for text in texts {
            Self::validate_tweet(text)?;
        }

        let mut posted: Vec<PostedTweet> = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(THREAD_DELAY).await;
            }

            let request = TweetRequest {
                text: text.clone(),
                reply: posted.last().map(|prev| TweetReply {
                    in_reply_to_tweet_id: prev.id.clone(),
                }),
            };

            match self.create_tweet(access_token, &request).await {
                Ok(tweet) => posted.push(tweet),
                Err(e) => {
                    tracing::warn!(
                        posted = posted.len(),
                        total = texts.len(),
                        error = %e,
                        "Thread interrupted"
                    );
                    return Err(e);
                }
            }
        }

        Ok(posted)
    }

    // ─── Analytics & discovery ───────────────────────────────────────────────

    pub async fn get_tweet_metrics(
        &self,
        access_token: &str,
        tweet_id: &str,
    ) -> Result<TweetMetrics, SocialError> {
        let response = self
            .http
            .get(format!("{}/tweets/{}", self.api_base, tweet_id))
            .bearer_auth(access_token)
            .query(&[("tweet.fields", "public_metrics")])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let tweet: DataEnvelope<TweetWithMetrics> =
            check_response_json(PLATFORM, response).await?;
        Ok(TweetMetrics {
            public_metrics: tweet.data.public_metrics.unwrap_or_default(),
        })
    }

    /// Trending topics for a location. Uses the app bearer token.
    pub async fn get_trending(&self, woeid: u32) -> Result<Vec<TrendingItem>, SocialError> {
        let bearer = self.app_bearer()?;
        let response = self
            .http
            .get(format!("{}/trends/by/woeid/{}", self.api_base, woeid))
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let trends: DataEnvelope<Vec<TwitterTrend>> =
            check_response_json(PLATFORM, response).await?;
        Ok(trends
            .data
            .into_iter()
            .map(|t| TrendingItem {
                url: Some(format!(
                    "https://twitter.com/search?q={}",
                    urlencoding::encode(&t.trend_name)
                )),
                name: t.trend_name,
                volume: t.tweet_count,
            })
            .collect())
    }

    /// Recent tweets matching a query (last 7 days). Uses the app bearer token.
    pub async fn search_recent(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchedTweet>, SocialError> {
        let bearer = self.app_bearer()?;
        let max_results = max_results.clamp(10, 100).to_string();
        let response = self
            .http
            .get(format!("{}/tweets/search/recent", self.api_base))
            .bearer_auth(bearer)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "public_metrics,created_at"),
            ])
            .send()
            .await
            .map_err(network_error(PLATFORM))?;

        let found: OptionalDataEnvelope<Vec<SearchedTweet>> =
            check_response_json(PLATFORM, response).await?;
        Ok(found.data.unwrap_or_default())
    }

    fn app_bearer(&self) -> Result<&str, SocialError> {
        self.bearer_token
            .as_deref()
            .ok_or_else(|| SocialError::unsupported(PLATFORM, "app-only endpoints without TWITTER_BEARER_TOKEN"))
    }
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Clone, Serialize)]
pub struct TweetRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<TweetReply>,
}

impl TweetRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TweetReply {
    pub in_reply_to_tweet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// Raw metrics for one tweet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TweetMetrics {
    pub public_metrics: PublicMetrics,
}

/// `public_metrics` object. Fields the API omits stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub quote_count: Option<u64>,
    #[serde(default)]
    pub bookmark_count: Option<u64>,
    #[serde(default)]
    pub impression_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchedTweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct OptionalDataEnvelope<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TweetWithMetrics {
    #[serde(default)]
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct TwitterTrend {
    trend_name: String,
    #[serde(default)]
    tweet_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    name: String,
    username: String,
    #[serde(default)]
    profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwitterTokenResponse {
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

    #[test]
    fn tweet_length_limit() {
        assert!(TwitterApi::validate_tweet(&"a".repeat(280)).is_ok());
        assert!(TwitterApi::validate_tweet(&"a".repeat(281)).is_err());
        assert!(TwitterApi::validate_tweet("   ").is_err());
    }

    #[test]
    fn first_tweet_has_no_reply_field() {
        let json = serde_json::to_value(TweetRequest::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn metrics_missing_fields_stay_unset() {
        let metrics: TweetMetrics = serde_json::from_value(serde_json::json!({
            "public_metrics": {"like_count": 5, "retweet_count": 1}
        }))
        .unwrap();
        assert_eq!(metrics.public_metrics.like_count, Some(5));
        assert_eq!(metrics.public_metrics.impression_count, None);
    }
}
