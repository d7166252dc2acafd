// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! In-memory credential records.
//!
//! One record per `(user, platform)`; platforms never share a record, even
//! Facebook and Instagram. Records are only removed by an explicit
//! [`CredentialStore::delete`].

use crate::models::{AccessTokens, AccountIds, Platform, Tokens};
use crate::services::oauth_state::MAX_STATE_AGE_MINUTES;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;

/// Stored credentials for one platform connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub tokens: Tokens,
    pub account_ids: AccountIds,
    pub connected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

type RecordKey = (String, Platform);

/// A verifier lives only as long as the state that carries its nonce.
#[derive(Debug, Clone)]
struct PendingVerifier {
    verifier: String,
    issued_at: DateTime<Utc>,
}

impl PendingVerifier {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::minutes(MAX_STATE_AGE_MINUTES)
    }
}

#[derive(Debug, Default)]
pub struct CredentialStore {
    records: DashMap<RecordKey, CredentialRecord>,
    /// PKCE verifiers waiting for their callback, keyed by state nonce.
    pending_verifiers: DashMap<String, PendingVerifier>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. `connected_at` survives replacement.
    pub fn put(&self, user_id: &str, platform: Platform, tokens: Tokens, account_ids: AccountIds) {
        let now = Utc::now();
        let key = (user_id.to_string(), platform);
        let connected_at = self
            .records
            .get(&key)
            .map(|r| r.connected_at)
            .unwrap_or(now);

        self.records.insert(
            key,
            CredentialRecord {
                tokens,
                account_ids,
                connected_at,
                updated_at: now,
            },
        );
        tracing::debug!(user_id, %platform, "Stored credentials");
    }

    pub fn get(&self, user_id: &str, platform: Platform) -> Option<CredentialRecord> {
        self.records
            .get(&(user_id.to_string(), platform))
            .map(|r| r.value().clone())
    }

    /// Replace tokens after a refresh, keeping the account ids.
    /// Returns `false` if there was no record to update.
    pub fn update_tokens(&self, user_id: &str, platform: Platform, tokens: Tokens) -> bool {
        match self.records.get_mut(&(user_id.to_string(), platform)) {
            Some(mut record) => {
                record.tokens = tokens;
                record.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn delete(&self, user_id: &str, platform: Platform) -> Option<CredentialRecord> {
        let removed = self
            .records
            .remove(&(user_id.to_string(), platform))
            .map(|(_, r)| r);
        if removed.is_some() {
            tracing::info!(user_id, %platform, "Deleted credentials");
        }
        removed
    }

    /// Connected platforms for a user, in platform order.
    pub fn platforms(&self, user_id: &str) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.records.contains_key(&(user_id.to_string(), *p)))
            .collect()
    }

    /// Token map in the shape the manager expects.
    pub fn access_tokens(&self, user_id: &str) -> AccessTokens {
        Platform::ALL
            .into_iter()
            .filter_map(|p| {
                self.get(user_id, p)
                    .map(|record| (p, record.tokens.access_token))
            })
            .collect()
    }

    pub fn account_ids(&self, user_id: &str, platform: Platform) -> AccountIds {
        self.get(user_id, platform)
            .map(|r| r.account_ids)
            .unwrap_or_default()
    }

    /// Park a verifier until its callback arrives. Verifiers of abandoned
    /// connects are evicted once their state could no longer verify.
    pub fn put_pkce_verifier(&self, nonce: &str, verifier: String) {
        self.put_pkce_verifier_at(nonce, verifier, Utc::now());
    }

    fn put_pkce_verifier_at(&self, nonce: &str, verifier: String, now: DateTime<Utc>) {
        let before = self.pending_verifiers.len();
        self.pending_verifiers.retain(|_, pending| !pending.is_expired(now));
        let evicted = before.saturating_sub(self.pending_verifiers.len());
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired PKCE verifiers");
        }

        self.pending_verifiers.insert(
            nonce.to_string(),
            PendingVerifier {
                verifier,
                issued_at: now,
            },
        );
    }

    /// Remove and return a pending verifier. Each verifier is usable once.
    pub fn take_pkce_verifier(&self, nonce: &str) -> Option<String> {
        self.take_pkce_verifier_at(nonce, Utc::now())
    }

    fn take_pkce_verifier_at(&self, nonce: &str, now: DateTime<Utc>) -> Option<String> {
        self.pending_verifiers
            .remove(nonce)
            .map(|(_, pending)| pending)
            .filter(|pending| !pending.is_expired(now))
            .map(|pending| pending.verifier)
    }
}
