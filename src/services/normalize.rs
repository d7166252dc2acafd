// SPDX-License-Identifier: MIT
// Copyright 2026 The social-publisher authors

//! Map per-platform raw metrics onto the canonical [`Metrics`] shape.
//!
//! Only fields a platform actually reports are copied. A metric the
//! platform does not expose stays `None` and is omitted from the JSON;
//! it is never reported as zero.

use crate::models::{Metrics, Platform};
use crate::platforms::facebook::FacebookPostInsights;
use crate::platforms::instagram::InstagramMediaInsights;
use crate::platforms::linkedin::SocialActions;
use crate::platforms::tiktok::TikTokVideo;
use crate::platforms::twitter::TweetMetrics;
use crate::platforms::youtube::VideoStatistics;

/// Raw analytics as each adapter returns them.
#[derive(Debug, Clone)]
pub enum PlatformMetrics {
    Facebook(FacebookPostInsights),
    Instagram(InstagramMediaInsights),
    Twitter(TweetMetrics),
    Youtube(VideoStatistics),
    Linkedin(SocialActions),
    Tiktok(TikTokVideo),
}

impl PlatformMetrics {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformMetrics::Facebook(_) => Platform::Facebook,
            PlatformMetrics::Instagram(_) => Platform::Instagram,
            PlatformMetrics::Twitter(_) => Platform::Twitter,
            PlatformMetrics::Youtube(_) => Platform::Youtube,
            PlatformMetrics::Linkedin(_) => Platform::Linkedin,
            PlatformMetrics::Tiktok(_) => Platform::Tiktok,
        }
    }
}

pub fn normalize_metrics(raw: &PlatformMetrics) -> Metrics {
    match raw {
        PlatformMetrics::Facebook(fb) => Metrics {
            views: None,
            likes: fb.reactions,
            comments: fb.comments,
            shares: fb.shares,
            engagement_rate: engagement_rate(fb.engaged_users, fb.reach),
            reach: fb.reach,
            impressions: fb.impressions,
        },
        PlatformMetrics::Instagram(ig) => Metrics {
            views: None,
            likes: ig.like_count,
            comments: ig.comments_count,
            shares: ig.shares,
            engagement_rate: engagement_rate(
                sum_present(&[ig.like_count, ig.comments_count, ig.saved, ig.shares]),
                ig.reach,
            ),
            reach: ig.reach,
            impressions: ig.impressions,
        },
        PlatformMetrics::Twitter(tweet) => {
            let m = &tweet.public_metrics;
            Metrics {
                views: m.impression_count,
                likes: m.like_count,
                comments: m.reply_count,
                shares: sum_present(&[m.retweet_count, m.quote_count]),
                engagement_rate: engagement_rate(
                    sum_present(&[m.like_count, m.reply_count, m.retweet_count, m.quote_count]),
                    m.impression_count,
                ),
                // Twitter has no reach metric.
                reach: None,
                impressions: m.impression_count,
            }
        }
        PlatformMetrics::Youtube(stats) => Metrics {
            views: stats.view_count,
            likes: stats.like_count,
            comments: stats.comment_count,
            ..Default::default()
        },
        PlatformMetrics::Linkedin(actions) => Metrics {
            likes: actions.likes,
            comments: actions.comments,
            ..Default::default()
        },
        PlatformMetrics::Tiktok(video) => Metrics {
            views: video.view_count,
            likes: video.like_count,
            comments: video.comment_count,
            shares: video.share_count,
            ..Default::default()
        },
    }
}

/// Sum of the reported values, or `None` when none were reported.
fn sum_present(values: &[Option<u64>]) -> Option<u64> {
    values
        .iter()
        .flatten()
        .copied()
        .reduce(|a, b| a.saturating_add(b))
}

/// Engagements per audience member, as a percentage.
fn engagement_rate(engagements: Option<u64>, audience: Option<u64>) -> Option<f64> {
    match (engagements, audience) {
        (Some(e), Some(a)) if a > 0 => Some(e as f64 / a as f64 * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::twitter::PublicMetrics;

    #[test]
    fn twitter_leaves_reach_unset() {
        let raw = PlatformMetrics::Twitter(TweetMetrics {
            public_metrics: PublicMetrics {
                like_count: Some(10),
                retweet_count: Some(2),
                reply_count: Some(1),
                ..Default::default()
            },
        });
        let m = normalize_metrics(&raw);
        assert_eq!(m.likes, Some(10));
        assert_eq!(m.shares, Some(2));
        assert_eq!(m.comments, Some(1));
        assert_eq!(m.reach, None);
        assert_eq!(m.impressions, None);
        assert_eq!(m.engagement_rate, None);
    }

    #[test]
    fn twitter_engagement_rate_with_impressions() {
        let raw = PlatformMetrics::Twitter(TweetMetrics {
            public_metrics: PublicMetrics {
                like_count: Some(8),
                retweet_count: Some(2),
                impression_count: Some(200),
                ..Default::default()
            },
        });
        let m = normalize_metrics(&raw);
        assert_eq!(m.engagement_rate, Some(5.0));
        assert_eq!(m.views, Some(200));
    }

    #[test]
    fn youtube_has_no_shares_or_reach() {
        let raw = PlatformMetrics::Youtube(VideoStatistics {
            view_count: Some(1000),
            like_count: Some(50),
            comment_count: Some(4),
            favorite_count: Some(0),
        });
        let m = normalize_metrics(&raw);
        assert_eq!(m.views, Some(1000));
        assert_eq!(m.shares, None);
        assert_eq!(m.reach, None);
    }

    #[test]
    fn facebook_engagement_rate_uses_reach() {
        let raw = PlatformMetrics::Facebook(FacebookPostInsights {
            impressions: Some(400),
            reach: Some(200),
            engaged_users: Some(20),
            reactions: Some(15),
            comments: None,
            shares: None,
        });
        let m = normalize_metrics(&raw);
        assert_eq!(m.engagement_rate, Some(10.0));
        assert_eq!(m.comments, None);
    }

    #[test]
    fn zero_reach_gives_no_rate() {
        assert_eq!(engagement_rate(Some(5), Some(0)), None);
        assert_eq!(sum_present(&[None, None]), None);
        assert_eq!(sum_present(&[Some(1), None, Some(2)]), Some(3));
    }
}
