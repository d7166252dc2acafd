// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Credential storage.
//!
//! Persistence is the embedding application's concern; this in-memory store
//! is the record shape the API layer works against.

pub mod credentials;

pub use credentials::{CredentialRecord, CredentialStore};
