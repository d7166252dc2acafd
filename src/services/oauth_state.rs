// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Signed OAuth `state` parameter.
//!
//! The state round-trips through the provider, so it carries everything the
//! callback needs (user, platform, nonce, issue time) and an HMAC-SHA256
//! signature. Wire format: `base64url("user|platform|nonce|issued_hex|sig_hex")`.

use crate::models::Platform;
use crate::platforms::pkce;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// States older than this are rejected.
pub const MAX_STATE_AGE_MINUTES: i64 = 15;
const NONCE_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("malformed state")]
    Malformed,
    #[error("state signature mismatch")]
    BadSignature,
    #[error("state expired")]
    Expired,
    #[error("state was issued for {0}")]
    WrongPlatform(Platform),
    #[error("state could not be created: {0}")]
    Create(String),
}

/// Decoded state parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub user_id: String,
    pub platform: Platform,
    /// Also keys the pending PKCE verifier for Twitter.
    pub nonce: String,
    pub issued_at: i64,
}

impl OAuthState {
    pub fn new(user_id: &str, platform: Platform) -> Result<Self, StateError> {
        let nonce = pkce::random_string(NONCE_LEN).map_err(|e| StateError::Create(e.to_string()))?;
        Ok(Self {
            user_id: user_id.to_string(),
            platform,
            nonce,
            issued_at: Utc::now().timestamp(),
        })
    }

    fn payload(&self) -> String {
        format!(
            "{}|{}|{}|{:x}",
            self.user_id, self.platform, self.nonce, self.issued_at
        )
    }

    /// Sign and encode for use as the `state` query parameter.
    pub fn encode(&self, secret: &[u8]) -> Result<String, StateError> {
        let payload = self.payload();
        let signature = sign(&payload, secret)?;
        Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, hex::encode(signature))))
    }

    /// Decode and verify a state received on the callback for `platform`.
    pub fn verify(
        state: &str,
        secret: &[u8],
        platform: Platform,
        now: DateTime<Utc>,
    ) -> Result<Self, StateError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(state)
            .map_err(|_| StateError::Malformed)?;
        let decoded = String::from_utf8(bytes).map_err(|_| StateError::Malformed)?;

        // Split from the right: the user id is the only free-form field.
        let mut parts = decoded.rsplitn(5, '|');
        let (Some(signature_hex), Some(issued_hex), Some(nonce), Some(platform_str), Some(user_id)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(StateError::Malformed);
        };

        let payload_len = decoded.len() - signature_hex.len() - 1;
        let expected = sign(&decoded[..payload_len], secret)?;
        let provided = hex::decode(signature_hex).map_err(|_| StateError::BadSignature)?;
        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            tracing::error!("OAuth state signature mismatch");
            return Err(StateError::BadSignature);
        }

        let state_platform: Platform = platform_str.parse().map_err(|_| StateError::Malformed)?;
        if state_platform != platform {
            return Err(StateError::WrongPlatform(state_platform));
        }

        let issued_at = i64::from_str_radix(issued_hex, 16).map_err(|_| StateError::Malformed)?;
        let issued = DateTime::from_timestamp(issued_at, 0).ok_or(StateError::Malformed)?;
        if now - issued > Duration::minutes(MAX_STATE_AGE_MINUTES) {
            return Err(StateError::Expired);
        }

        Ok(Self {
            user_id: user_id.to_string(),
            platform: state_platform,
            nonce: nonce.to_string(),
            issued_at,
        })
    }
}

fn sign(payload: &str, secret: &[u8]) -> Result<Vec<u8>, StateError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| StateError::Create(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"state_secret";

    #[test]
    fn round_trip() {
        let state = OAuthState::new("user|with|pipes", Platform::Youtube).unwrap();
        let encoded = state.encode(SECRET).unwrap();
        let decoded = OAuthState::verify(&encoded, SECRET, Platform::Youtube, Utc::now()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let encoded = OAuthState::new("u1", Platform::Facebook)
            .unwrap()
            .encode(SECRET)
            .unwrap();
        assert_eq!(
            OAuthState::verify(&encoded, b"other", Platform::Facebook, Utc::now()),
            Err(StateError::BadSignature)
        );
    }

    #[test]
    fn platform_must_match() {
        let encoded = OAuthState::new("u1", Platform::Twitter)
            .unwrap()
            .encode(SECRET)
            .unwrap();
        assert_eq!(
            OAuthState::verify(&encoded, SECRET, Platform::Linkedin, Utc::now()),
            Err(StateError::WrongPlatform(Platform::Twitter))
        );
    }

    #[test]
    fn stale_state_is_rejected() {
        let encoded = OAuthState::new("u1", Platform::Tiktok)
            .unwrap()
            .encode(SECRET)
            .unwrap();
        let later = Utc::now() + Duration::minutes(MAX_STATE_AGE_MINUTES + 1);
        assert_eq!(
            OAuthState::verify(&encoded, SECRET, Platform::Tiktok, later),
            Err(StateError::Expired)
        );
    }

    #[test]
    fn malformed_state() {
        let encoded = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(
            OAuthState::verify(&encoded, SECRET, Platform::Tiktok, Utc::now()),
            Err(StateError::Malformed)
        );
        assert_eq!(
            OAuthState::verify("%%%", SECRET, Platform::Tiktok, Utc::now()),
            Err(StateError::Malformed)
        );
    }
}
