// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Pieces of the Facebook Graph API shared by the Facebook and Instagram
//! adapters: the login dialog, the two-hop token exchange and `debug_token`.

use super::http::{check_response_json, network_error, query_string, token_response};
use crate::config::PlatformCredentials;
use crate::error::SocialError;
use crate::models::{Platform, TokenValidation, Tokens};
use chrono::DateTime;
use serde::Deserialize;

pub const GRAPH_BASE: &str = "https://graph.facebook.com/v18.0";
pub const DIALOG_BASE: &str = "https://www.facebook.com/v18.0/dialog/oauth";

/// Graph error codes that mean the token is invalid or expired.
const GRAPH_TOKEN_ERROR_CODES: [i64; 2] = [102, 190];
/// Graph throttling codes (app, user, page and custom limits).
const GRAPH_THROTTLE_CODES: [i64; 5] = [4, 17, 32, 613, 80001];

/// Build the login dialog URL with a fixed comma-separated scope list.
pub(crate) fn dialog_url(
    dialog_base: &str,
    creds: &PlatformCredentials,
    scopes: &[&str],
    state: Option<&str>,
) -> String {
    let scope = scopes.join(",");
    let mut params = vec![
        ("client_id", creds.client_id.as_str()),
        ("redirect_uri", creds.redirect_uri.as_str()),
        ("scope", scope.as_str()),
        ("response_type", "code"),
    ];
    if let Some(state) = state {
        params.push(("state", state));
    }
    format!("{}?{}", dialog_base, query_string(&params))
}

#[derive(Debug, Deserialize)]
struct GraphTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Exchange an authorization code for a long-lived (~60 day) token.
///
/// The code grant only yields a ~2 hour token; the second
/// `fb_exchange_token` hop is what makes the credential usable.
pub(crate) async fn exchange_code_for_long_lived_token(
    http: &reqwest::Client,
    graph_base: &str,
    creds: &PlatformCredentials,
    platform: Platform,
    code: &str,
    scopes: &[&str],
) -> Result<Tokens, SocialError> {
    let short_lived: GraphTokenResponse = {
        let response = http
            .get(format!("{}/oauth/access_token", graph_base))
            .query(&[
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", creds.redirect_uri.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| SocialError::oauth(platform, format!("Token exchange failed: {}", e)))?;
        token_response(platform, response).await?
    };

    let long_lived: GraphTokenResponse = {
        let response = http
            .get(format!("{}/oauth/access_token", graph_base))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("fb_exchange_token", short_lived.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                SocialError::oauth(platform, format!("Long-lived token exchange failed: {}", e))
            })?;
        token_response(platform, response).await?
    };

    tracing::info!(
        %platform,
        expires_in = ?long_lived.expires_in,
        "Exchanged code for long-lived Graph token"
    );

    Ok(Tokens {
        access_token: long_lived.access_token,
        refresh_token: None,
        expires_at: Tokens::expiry_from_now(long_lived.expires_in),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        user_id: None,
    })
}

#[derive(Debug, Deserialize)]
struct DebugTokenEnvelope {
    data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
struct DebugTokenData {
    #[serde(default)]
    is_valid: bool,
    /// Unix seconds; 0 means the token does not expire.
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    scopes: Option<Vec<String>>,
}

/// Introspect a user token with the app token `client_id|client_secret`.
pub(crate) async fn debug_token(
    http: &reqwest::Client,
    graph_base: &str,
    creds: &PlatformCredentials,
    platform: Platform,
    access_token: &str,
) -> Result<TokenValidation, SocialError> {
    let app_token = format!("{}|{}", creds.client_id, creds.client_secret);
    let response = http
        .get(format!("{}/debug_token", graph_base))
        .query(&[
            ("input_token", access_token),
            ("access_token", app_token.as_str()),
        ])
        .send()
        .await
        .map_err(network_error(platform))?;

    let envelope: DebugTokenEnvelope = graph_json(platform, response).await?;
    let data = envelope.data;

    Ok(TokenValidation {
        is_valid: data.is_valid,
        expires_at: data
            .expires_at
            .filter(|ts| *ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        scopes: data.scopes.map(|s| s.into_iter().collect()),
    })
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    code: i64,
}

/// Parse a Graph response, reclassifying Graph's 400-with-code errors.
///
/// Graph reports expired tokens and throttling as HTTP 400 with an error
/// code in the body, so status-only classification is not enough.
pub(crate) async fn graph_json<T: serde::de::DeserializeOwned>(
    platform: Platform,
    response: reqwest::Response,
) -> Result<T, SocialError> {
    check_response_json(platform, response)
        .await
        .map_err(reclassify)
}

/// Turn an `Upstream` Graph error into `Auth`/`RateLimit` when its code says so.
pub(crate) fn reclassify(err: SocialError) -> SocialError {
    let SocialError::Upstream {
        platform,
        status,
        message,
    } = err
    else {
        return err;
    };

    let code = serde_json::from_str::<GraphErrorEnvelope>(&message)
        .map(|e| e.error.code)
        .unwrap_or_default();

    if GRAPH_TOKEN_ERROR_CODES.contains(&code) {
        SocialError::Auth { platform, message }
    } else if GRAPH_THROTTLE_CODES.contains(&code) {
        tracing::warn!(%platform, code, "Graph throttling error");
        SocialError::RateLimit {
            platform,
            retry_after: None,
        }
    } else {
        SocialError::Upstream {
            platform,
            status,
            message,
        }
    }
}

/// `{"id": "..."}` returned by most Graph create calls.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphId {
    pub id: String,
}

/// One entry of an `/insights` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InsightMetric {
    pub name: String,
    #[serde(default)]
    pub values: Vec<InsightValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InsightValue {
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InsightsEnvelope {
    #[serde(default)]
    pub data: Vec<InsightMetric>,
}

impl InsightsEnvelope {
    /// First numeric value of a named metric. Object-valued metrics
    /// (reactions by type) are summed.
    pub fn value(&self, name: &str) -> Option<u64> {
        let metric = self.data.iter().find(|m| m.name == name)?;
        let value = &metric.values.first()?.value;
        match value {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::Object(map) => Some(map.values().filter_map(|v| v.as_u64()).sum()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_url_contains_all_scopes() {
        let creds = PlatformCredentials::new("app", "secret", "http://localhost/cb");
        let url = dialog_url(DIALOG_BASE, &creds, &["a_scope", "b_scope"], Some("xyz"));
        assert!(url.starts_with(DIALOG_BASE));
        assert!(url.contains("scope=a_scope%2Cb_scope"));
        assert!(url.contains("state=xyz"));
    }

    #[test]
    fn expired_token_code_becomes_auth_error() {
        let err = reclassify(SocialError::Upstream {
            platform: Platform::Facebook,
            status: 400,
            message: r#"{"error":{"message":"Error validating access token","code":190}}"#
                .to_string(),
        });
        assert!(err.is_auth_error());
    }

    #[test]
    fn throttle_code_becomes_rate_limit() {
        let err = reclassify(SocialError::Upstream {
            platform: Platform::Instagram,
            status: 400,
            message: r#"{"error":{"message":"Application request limit reached","code":4}}"#
                .to_string(),
        });
        assert!(matches!(err, SocialError::RateLimit { .. }));
    }

    #[test]
    fn other_codes_stay_upstream() {
        let body = r#"{"error":{"message":"Invalid parameter","code":100}}"#;
        let err = reclassify(SocialError::Upstream {
            platform: Platform::Facebook,
            status: 400,
            message: body.to_string(),
        });
        assert_eq!(
            err,
            SocialError::Upstream {
                platform: Platform::Facebook,
                status: 400,
                message: body.to_string()
            }
        );
    }

    #[test]
    fn insights_value_sums_objects() {
        let env: InsightsEnvelope = serde_json::from_value(serde_json::json!({
            "data": [
                {"name": "post_impressions", "values": [{"value": 120}]},
                {"name": "post_reactions_by_type_total", "values": [{"value": {"like": 4, "love": 2}}]}
            ]
        }))
        .unwrap();
        assert_eq!(env.value("post_impressions"), Some(120));
        assert_eq!(env.value("post_reactions_by_type_total"), Some(6));
        assert_eq!(env.value("post_clicks"), None);
    }
}
