// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Error types: the adapter taxonomy and the HTTP-facing application error.

use crate::models::Platform;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure of a single adapter operation.
///
/// Adapters return these; the facade converts them into per-platform
/// results so one platform's failure never aborts its siblings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocialError {
    /// Authorization or code exchange failed; the user must re-authorize.
    #[error("{platform} OAuth error: {message}")]
    OAuth { platform: Platform, message: String },

    /// A call was rejected for credential reasons; may heal via refresh.
    #[error("{platform} rejected the access token: {message}")]
    Auth { platform: Platform, message: String },

    /// Payload violates platform constraints. Detected before any network call.
    #[error("{platform} validation failed: {message}")]
    Validation { platform: Platform, message: String },

    #[error("{platform} rate limit exceeded")]
    RateLimit {
        platform: Platform,
        retry_after: Option<u64>,
    },

    /// Any other non-2xx response. `message` is the vendor body, unmodified.
    #[error("{platform} API error (status {status}): {message}")]
    Upstream {
        platform: Platform,
        status: u16,
        message: String,
    },

    /// The platform has no way to perform this operation.
    #[error("{platform} does not support {operation}")]
    Unsupported {
        platform: Platform,
        operation: &'static str,
    },

    #[error("{platform} request failed: {message}")]
    Network { platform: Platform, message: String },

    #[error("{platform} returned an unexpected response: {message}")]
    Parse { platform: Platform, message: String },
}

impl SocialError {
    pub fn validation(platform: Platform, message: impl Into<String>) -> Self {
        SocialError::Validation {
            platform,
            message: message.into(),
        }
    }

    pub fn oauth(platform: Platform, message: impl Into<String>) -> Self {
        SocialError::OAuth {
            platform,
            message: message.into(),
        }
    }

    pub fn unsupported(platform: Platform, operation: &'static str) -> Self {
        SocialError::Unsupported {
            platform,
            operation,
        }
    }

    pub fn network(platform: Platform, err: impl std::fmt::Display) -> Self {
        SocialError::Network {
            platform,
            message: err.to_string(),
        }
    }

    pub fn parse(platform: Platform, err: impl std::fmt::Display) -> Self {
        SocialError::Parse {
            platform,
            message: err.to_string(),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            SocialError::OAuth { platform, .. }
            | SocialError::Auth { platform, .. }
            | SocialError::Validation { platform, .. }
            | SocialError::RateLimit { platform, .. }
            | SocialError::Upstream { platform, .. }
            | SocialError::Unsupported { platform, .. }
            | SocialError::Network { platform, .. }
            | SocialError::Parse { platform, .. } => *platform,
        }
    }

    /// Credential problem that a refresh or re-authorization could fix.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SocialError::Auth { .. } | SocialError::OAuth { .. })
    }

    /// Whether a caller may reasonably retry later. Publishing callers still
    /// need idempotency care: a network failure may hide a completed post.
    pub fn is_retryable(&self) -> bool {
        match self {
            SocialError::RateLimit { .. } | SocialError::Network { .. } => true,
            SocialError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Social(err) => {
                let (status, code) = match err {
                    SocialError::OAuth { .. } => (StatusCode::UNAUTHORIZED, "oauth_error"),
                    SocialError::Auth { .. } => (StatusCode::UNAUTHORIZED, "invalid_token"),
                    SocialError::Validation { .. } => {
                        (StatusCode::BAD_REQUEST, "validation_error")
                    }
                    SocialError::RateLimit { .. } => {
                        (StatusCode::TOO_MANY_REQUESTS, "rate_limited")
                    }
                    SocialError::Unsupported { .. } => (StatusCode::BAD_REQUEST, "unsupported"),
                    SocialError::Upstream { .. }
                    | SocialError::Network { .. }
                    | SocialError::Parse { .. } => {
                        tracing::warn!(error = %err, "Platform call failed");
                        (StatusCode::BAD_GATEWAY, "platform_error")
                    }
                };
                (status, code, Some(err.to_string()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let platform = match &self {
            AppError::Social(err) => Some(err.platform()),
            _ => None,
        };

        let body = ErrorResponse {
            error: error.to_string(),
            platform,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
