// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! PKCE (RFC 7636) verifier/challenge generation and random tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Unreserved characters allowed in a code verifier.
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Verifier length. RFC 7636 allows 43..=128.
pub const CODE_VERIFIER_LEN: usize = 128;

/// A verifier the caller must persist, and the challenge sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl PkceChallenge {
    pub const METHOD: &'static str = "S256";
}

/// Failure of the system random source.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("system random source unavailable")]
pub struct RandomUnavailable;

/// Generate a fresh verifier and its S256 challenge.
pub fn generate_code_challenge() -> Result<PkceChallenge, RandomUnavailable> {
    let code_verifier = random_string(CODE_VERIFIER_LEN)?;
    let code_challenge = challenge_for(&code_verifier);
    Ok(PkceChallenge {
        code_verifier,
        code_challenge,
    })
}

/// base64url(SHA-256(verifier)) without padding.
pub fn challenge_for(code_verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()))
}

/// Random string over the unreserved charset, without modulo bias.
pub fn random_string(len: usize) -> Result<String, RandomUnavailable> {
    let rng = SystemRandom::new();
    // Largest multiple of the charset size that fits in a byte.
    let limit = (256 / VERIFIER_CHARSET.len() * VERIFIER_CHARSET.len()) as u8;

    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];
    while out.len() < len {
        rng.fill(&mut buf).map_err(|_| RandomUnavailable)?;
        for b in buf {
            if b >= limit {
                continue;
            }
            out.push(VERIFIER_CHARSET[(b as usize) % VERIFIER_CHARSET.len()] as char);
            if out.len() == len {
                break;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_has_expected_shape() {
        let pkce = generate_code_challenge().unwrap();
        assert_eq!(pkce.code_verifier.len(), CODE_VERIFIER_LEN);
        assert!(pkce
            .code_verifier
            .bytes()
            .all(|b| VERIFIER_CHARSET.contains(&b)));
    }

    #[test]
    fn challenge_round_trips() {
        for _ in 0..16 {
            let pkce = generate_code_challenge().unwrap();
            assert_eq!(challenge_for(&pkce.code_verifier), pkce.code_challenge);
            assert!(!pkce.code_challenge.contains('='));
        }
    }

    #[test]
    fn rfc7636_appendix_b_vector() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K0uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGrSstw-cM"
        );
    }

    #[test]
    fn verifiers_are_unique() {
        let a = generate_code_challenge().unwrap();
        let b = generate_code_challenge().unwrap();
        assert_ne!(a.code_verifier, b.code_verifier);
    }
}
