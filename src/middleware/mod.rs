// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Middleware modules.

pub mod auth;

pub use auth::require_auth;
