// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Authorization URLs request exactly each platform's scope set.

use reqwest::Url;
use social_publisher::models::Platform;
use social_publisher::platforms::{
    pkce, FacebookApi, InstagramApi, LinkedInApi, TikTokApi, TwitterApi, YouTubeApi,
};
use std::collections::{BTreeMap, BTreeSet};

mod common;

fn query(url: &str) -> BTreeMap<String, String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn requested_scopes(url: &str, separator: char) -> BTreeSet<String> {
    query(url)["scope"]
        .split(separator)
        .map(str::to_string)
        .collect()
}

fn scope_set(scopes: &[&str]) -> BTreeSet<String> {
    scopes.iter().map(|s| s.to_string()).collect()
}

fn separator(platform: Platform) -> char {
    match platform {
        Platform::Facebook | Platform::Instagram | Platform::Tiktok => ',',
        Platform::Twitter | Platform::Youtube | Platform::Linkedin => ' ',
    }
}

fn expected_scopes(platform: Platform) -> BTreeSet<String> {
    scope_set(match platform {
        Platform::Facebook => FacebookApi::SCOPES,
        Platform::Instagram => InstagramApi::SCOPES,
        Platform::Twitter => TwitterApi::SCOPES,
        Platform::Youtube => YouTubeApi::SCOPES,
        Platform::Linkedin => LinkedInApi::SCOPES,
        Platform::Tiktok => TikTokApi::SCOPES,
    })
}

#[test]
fn test_each_platform_requests_its_scopes() {
    let manager = common::test_manager(common::test_adapters());
    let challenge = pkce::challenge_for("a-verifier");

    for platform in Platform::ALL {
        let url = manager
            .get_auth_url(platform, Some("state-1"), Some(&challenge))
            .unwrap();
        assert_eq!(
            requested_scopes(&url, separator(platform)),
            expected_scopes(platform),
            "scope mismatch for {}",
            platform
        );
        assert_eq!(query(&url)["state"], "state-1");
    }
}

#[test]
fn test_scope_sets_do_not_leak_between_platforms() {
    assert!(!expected_scopes(Platform::Instagram).contains("pages_manage_posts"));
    assert!(expected_scopes(Platform::Facebook).contains("instagram_content_publish"));
    assert!(expected_scopes(Platform::Twitter).contains("offline.access"));
    assert!(!expected_scopes(Platform::Linkedin).contains("offline.access"));
}

#[test]
fn test_instagram_reuses_facebook_dialog() {
    let manager = common::test_manager(common::test_adapters());
    let urls = manager.get_auth_urls(Some("s")).unwrap();

    let facebook = &urls.urls[&Platform::Facebook];
    let instagram = &urls.urls[&Platform::Instagram];
    assert_eq!(instagram, facebook);
    assert!(instagram.starts_with("https://www.facebook.com/v18.0/dialog/oauth"));

    // The dedicated Instagram connect uses the same dialog with its own scopes.
    let dedicated = manager
        .get_auth_url(Platform::Instagram, Some("s"), None)
        .unwrap();
    let dedicated_url = Url::parse(&dedicated).unwrap();
    let facebook_url = Url::parse(facebook).unwrap();
    assert_eq!(dedicated_url.host_str(), facebook_url.host_str());
    assert_eq!(dedicated_url.path(), facebook_url.path());
    assert_eq!(
        requested_scopes(&dedicated, ','),
        expected_scopes(Platform::Instagram)
    );
}

#[test]
fn test_twitter_url_carries_pkce_challenge() {
    let manager = common::test_manager(common::test_adapters());
    let urls = manager.get_auth_urls(None).unwrap();

    let params = query(&urls.urls[&Platform::Twitter]);
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(
        params["code_challenge"],
        pkce::challenge_for(&urls.twitter_code_verifier)
    );
    assert!(!params.contains_key("state"));
}

#[test]
fn test_youtube_requests_offline_access() {
    let manager = common::test_manager(common::test_adapters());
    let url = manager.get_auth_url(Platform::Youtube, None, None).unwrap();

    let params = query(&url);
    assert_eq!(params["access_type"], "offline");
    assert_eq!(params["prompt"], "consent");
}
