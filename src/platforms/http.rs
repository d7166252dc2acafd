// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Response classification shared by every adapter.
//!
//! Status mapping: 401/403 are credential failures, 429 is a rate limit,
//! any other non-2xx is an upstream error carrying the vendor body as-is.
//! Adapters never retry; that decision belongs to the caller.

use crate::error::SocialError;
use crate::models::Platform;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Map a transport failure (DNS, TLS, timeout) to a `Network` error.
pub(crate) fn network_error(platform: Platform) -> impl Fn(reqwest::Error) -> SocialError {
    move |e| SocialError::network(platform, e)
}

/// Return the response if it succeeded, otherwise the classified error.
pub(crate) async fn check_response(
    platform: Platform,
    response: reqwest::Response,
) -> Result<reqwest::Response, SocialError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    Err(classify_status(platform, status, retry_after, body))
}

/// Classify a non-2xx status.
pub(crate) fn classify_status(
    platform: Platform,
    status: StatusCode,
    retry_after: Option<u64>,
    body: String,
) -> SocialError {
    match status.as_u16() {
        429 => {
            tracing::warn!(%platform, ?retry_after, "Platform rate limit hit (429)");
            SocialError::RateLimit {
                platform,
                retry_after,
            }
        }
        401 | 403 => SocialError::Auth {
            platform,
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        },
        code => SocialError::Upstream {
            platform,
            status: code,
            message: body,
        },
    }
}

/// Check response and parse JSON body.
pub(crate) async fn check_response_json<T: DeserializeOwned>(
    platform: Platform,
    response: reqwest::Response,
) -> Result<T, SocialError> {
    let response = check_response(platform, response).await?;
    response
        .json()
        .await
        .map_err(|e| SocialError::parse(platform, format!("JSON parse error: {}", e)))
}

/// Parse a token endpoint response. Any failure here means the grant was
/// rejected, so it surfaces as `OAuth` with the provider's body.
pub(crate) async fn token_response<T: DeserializeOwned>(
    platform: Platform,
    response: reqwest::Response,
) -> Result<T, SocialError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%platform, status = %status, body = %body, "Token exchange failed");
        return Err(SocialError::oauth(
            platform,
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| SocialError::oauth(platform, format!("Failed to parse token response: {}", e)))
}

/// A media asset whose download has started but whose body is unread.
pub(crate) struct MediaDownload {
    platform: Platform,
    url: String,
    response: reqwest::Response,
}

/// Start downloading a media asset referenced by URL. A URL that cannot be
/// fetched is reported as a validation error.
pub(crate) async fn open_media(
    http: &reqwest::Client,
    platform: Platform,
    url: &str,
) -> Result<MediaDownload, SocialError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(network_error(platform))?;

    if !response.status().is_success() {
        return Err(SocialError::validation(
            platform,
            format!("media {} could not be fetched: HTTP {}", url, response.status()),
        ));
    }

    Ok(MediaDownload {
        platform,
        url: url.to_string(),
        response,
    })
}

impl MediaDownload {
    /// Size announced by the media host, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Image type from the response, else from the URL's extension.
    pub fn image_content_type(&self) -> Option<String> {
        self.response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"))
            .or_else(|| image_type_for_url(&self.url).map(str::to_string))
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Vec<u8>, SocialError> {
        let bytes = self
            .response
            .bytes()
            .await
            .map_err(network_error(self.platform))?;
        Ok(bytes.to_vec())
    }

    /// A request body and its exact length. Streams when the host announced
    /// a length; otherwise the asset is buffered to learn it.
    pub async fn into_sized_body(self) -> Result<(reqwest::Body, u64), SocialError> {
        match self.content_length() {
            Some(len) => Ok((
                reqwest::Body::wrap_stream(self.response.bytes_stream()),
                len,
            )),
            None => {
                let bytes = self.bytes().await?;
                let len = bytes.len() as u64;
                Ok((reqwest::Body::from(bytes), len))
            }
        }
    }

    /// Pull the body as consecutive pieces of the requested sizes.
    pub fn into_chunks(self) -> ChunkReader {
        ChunkReader {
            platform: self.platform,
            response: self.response,
            buffer: Vec::new(),
        }
    }
}

/// Cuts a download into upload chunks; holds at most one chunk plus one
/// network frame in memory.
pub(crate) struct ChunkReader {
    platform: Platform,
    response: reqwest::Response,
    buffer: Vec<u8>,
}

impl ChunkReader {
    /// Next `len` bytes. Fails if the body ends early.
    pub async fn next_chunk(&mut self, len: usize) -> Result<Vec<u8>, SocialError> {
        while self.buffer.len() < len {
            match self
                .response
                .chunk()
                .await
                .map_err(network_error(self.platform))?
            {
                Some(frame) => self.buffer.extend_from_slice(&frame),
                None => {
                    return Err(SocialError::validation(
                        self.platform,
                        "media ended before its announced size",
                    ))
                }
            }
        }
        let rest = self.buffer.split_off(len);
        Ok(std::mem::replace(&mut self.buffer, rest))
    }

    /// Whether anything is left after the planned chunks.
    pub async fn has_remaining(&mut self) -> Result<bool, SocialError> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        while let Some(frame) = self
            .response
            .chunk()
            .await
            .map_err(network_error(self.platform))?
        {
            if !frame.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn image_type_for_url(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Encode `key=value` pairs into a query string.
pub(crate) fn query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Character count as users perceive it for limits (Unicode scalar values).
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_type_from_extension() {
        assert_eq!(image_type_for_url("https://cdn.example/t.PNG"), Some("image/png"));
        assert_eq!(
            image_type_for_url("https://cdn.example/t.jpeg?sig=abc.def"),
            Some("image/jpeg")
        );
        assert_eq!(image_type_for_url("https://cdn.example/thumb"), None);
    }

    #[test]
    fn query_string_encodes_values() {
        let qs = query_string(&[
            ("redirect_uri", "http://localhost:8080/cb"),
            ("scope", "a b"),
        ]);
        assert_eq!(
            qs,
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcb&scope=a%20b"
        );
    }

    #[test]
    fn status_classification() {
        let err = classify_status(
            Platform::Twitter,
            StatusCode::TOO_MANY_REQUESTS,
            Some(30),
            String::new(),
        );
        assert_eq!(
            err,
            SocialError::RateLimit {
                platform: Platform::Twitter,
                retry_after: Some(30)
            }
        );

        let err = classify_status(
            Platform::Linkedin,
            StatusCode::UNAUTHORIZED,
            None,
            "expired".to_string(),
        );
        assert!(err.is_auth_error());

        let err = classify_status(
            Platform::Tiktok,
            StatusCode::BAD_REQUEST,
            None,
            "{\"error\":\"bad\"}".to_string(),
        );
        assert_eq!(
            err,
            SocialError::Upstream {
                platform: Platform::Tiktok,
                status: 400,
                message: "{\"error\":\"bad\"}".to_string()
            }
        );
    }

    #[test]
    fn char_len_counts_scalars() {
        assert_eq!(char_len("héllo"), 5);
    }
}
