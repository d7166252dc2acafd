// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Application configuration loaded from environment variables.
//!
//! Each platform needs an OAuth client id/secret and a redirect URI. Twitter
//! and YouTube additionally take server-to-server credentials for endpoints
//! that do not act on behalf of a user (trends, search).

use crate::models::Platform;
use std::env;

/// OAuth application registered with one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl PlatformCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Everything the publishing layer needs to construct its adapters.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    pub facebook: PlatformCredentials,
    /// Instagram logs in through the Facebook dialog; defaults to the Facebook app.
    pub instagram: PlatformCredentials,
    pub twitter: PlatformCredentials,
    /// App-only bearer token for trends and search.
    pub twitter_bearer_token: Option<String>,
    pub youtube: PlatformCredentials,
    /// API key for unauthenticated Data API reads (most popular chart).
    pub youtube_api_key: Option<String>,
    pub linkedin: PlatformCredentials,
    pub tiktok: PlatformCredentials,
}

impl SocialConfig {
    /// Credentials for a platform.
    pub fn credentials(&self, platform: Platform) -> &PlatformCredentials {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Instagram => &self.instagram,
            Platform::Twitter => &self.twitter,
            Platform::Youtube => &self.youtube,
            Platform::Linkedin => &self.linkedin,
            Platform::Tiktok => &self.tiktok,
        }
    }

    /// Load platform credentials from the environment.
    ///
    /// Redirect URIs are derived from `redirect_base` as
    /// `{redirect_base}/auth/{platform}/callback`.
    pub fn from_env(redirect_base: &str) -> Result<Self, ConfigError> {
        let redirect = |platform: Platform| callback_url(redirect_base, platform);

        let facebook = PlatformCredentials::new(
            required("FACEBOOK_CLIENT_ID")?,
            required("FACEBOOK_CLIENT_SECRET")?,
            redirect(Platform::Facebook),
        );

        let instagram = PlatformCredentials::new(
            optional("INSTAGRAM_CLIENT_ID").unwrap_or_else(|| facebook.client_id.clone()),
            optional("INSTAGRAM_CLIENT_SECRET").unwrap_or_else(|| facebook.client_secret.clone()),
            redirect(Platform::Instagram),
        );

        Ok(Self {
            facebook,
            instagram,
            twitter: PlatformCredentials::new(
                required("TWITTER_CLIENT_ID")?,
                required("TWITTER_CLIENT_SECRET")?,
                redirect(Platform::Twitter),
            ),
            twitter_bearer_token: optional("TWITTER_BEARER_TOKEN"),
            youtube: PlatformCredentials::new(
                required("YOUTUBE_CLIENT_ID")?,
                required("YOUTUBE_CLIENT_SECRET")?,
                redirect(Platform::Youtube),
            ),
            youtube_api_key: optional("YOUTUBE_API_KEY"),
            linkedin: PlatformCredentials::new(
                required("LINKEDIN_CLIENT_ID")?,
                required("LINKEDIN_CLIENT_SECRET")?,
                redirect(Platform::Linkedin),
            ),
            tiktok: PlatformCredentials::new(
                required("TIKTOK_CLIENT_KEY")?,
                required("TIKTOK_CLIENT_SECRET")?,
                redirect(Platform::Tiktok),
            ),
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        let creds = |platform: Platform| {
            PlatformCredentials::new(
                format!("{}_client_id", platform),
                format!("{}_client_secret", platform),
                callback_url("http://localhost:8080", platform),
            )
        };

        Self {
            facebook: creds(Platform::Facebook),
            instagram: creds(Platform::Instagram),
            twitter: creds(Platform::Twitter),
            twitter_bearer_token: Some("test_bearer".to_string()),
            youtube: creds(Platform::Youtube),
            youtube_api_key: Some("test_api_key".to_string()),
            linkedin: creds(Platform::Linkedin),
            tiktok: creds(Platform::Tiktok),
        }
    }
}

/// OAuth callback URL for a platform.
pub fn callback_url(base: &str, platform: Platform) -> String {
    format!("{}/auth/{}/callback", base.trim_end_matches('/'), platform)
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for post-OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Key shared with the identity provider for session JWTs (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
    /// Platform OAuth apps
    pub social: SocialConfig,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let redirect_base =
            optional("OAUTH_REDIRECT_BASE").unwrap_or_else(|| "http://localhost:8080".to_string());

        Ok(Self {
            frontend_url: optional("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: required("JWT_SIGNING_KEY")?.into_bytes(),
            oauth_state_key: required("OAUTH_STATE_KEY")?.into_bytes(),
            social: SocialConfig::from_env(&redirect_base)?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            social: SocialConfig::test_default(),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        for (key, value) in [
            ("FACEBOOK_CLIENT_ID", "fb_id"),
            ("FACEBOOK_CLIENT_SECRET", "fb_secret"),
            ("TWITTER_CLIENT_ID", "tw_id"),
            ("TWITTER_CLIENT_SECRET", "tw_secret"),
            ("YOUTUBE_CLIENT_ID", "yt_id"),
            ("YOUTUBE_CLIENT_SECRET", "yt_secret"),
            ("LINKEDIN_CLIENT_ID", "li_id"),
            ("LINKEDIN_CLIENT_SECRET", "li_secret"),
            ("TIKTOK_CLIENT_KEY", "tt_key"),
            ("TIKTOK_CLIENT_SECRET", "tt_secret"),
            ("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!"),
            ("OAUTH_STATE_KEY", "test_state_key"),
            ("OAUTH_REDIRECT_BASE", "https://api.example.com/"),
        ] {
            env::set_var(key, value);
        }
        env::remove_var("INSTAGRAM_CLIENT_ID");
        env::remove_var("INSTAGRAM_CLIENT_SECRET");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.social.tiktok.client_id, "tt_key");
        assert_eq!(config.social.instagram.client_id, "fb_id");
        assert_eq!(
            config.social.linkedin.redirect_uri,
            "https://api.example.com/auth/linkedin/callback"
        );
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_credentials_lookup() {
        let social = SocialConfig::test_default();
        assert_eq!(
            social.credentials(Platform::Youtube).client_id,
            "youtube_client_id"
        );
    }
}
