//! Popularity and maintenance scores.
//!
//! Both scores are pure functions of [`RawMetrics`]. Popularity is a capped
//! weighted sum; maintenance is the sum of two stepped buckets, so its floor is
//! 10 rather than 0.

use chrono::{DateTime, Utc};

use crate::types::RawMetrics;

const STAR_CEILING: f64 = 10_000.0;
const STAR_WEIGHT: f64 = 60.0;
const FORK_CEILING: f64 = 2_000.0;
const FORK_WEIGHT: f64 = 30.0;
const WATCHER_CEILING: f64 = 1_000.0;
const WATCHER_WEIGHT: f64 = 10.0;

/// `(max days since last push, points)`, checked in order.
const RECENCY_BUCKETS: [(i64, u8); 5] = [(7, 50), (30, 40), (90, 30), (180, 20), (365, 10)];
/// `(max open issues, points)`, checked in order.
const ISSUE_BUCKETS: [(u64, u8); 5] = [(10, 50), (50, 40), (100, 30), (200, 20), (500, 10)];
const BUCKET_FLOOR: u8 = 5;

fn capped(count: u64, ceiling: f64, weight: f64) -> f64 {
    (count as f64 / ceiling * weight).min(weight)
}

/// Popularity score in `0..=100`.
///
/// Stars contribute up to 60 points (saturating at 10,000), forks up to 30
/// (at 2,000) and watchers up to 10 (at 1,000).
pub fn popularity_score(metrics: &RawMetrics) -> u8 {
    let total = capped(metrics.stars, STAR_CEILING, STAR_WEIGHT)
        + capped(metrics.forks, FORK_CEILING, FORK_WEIGHT)
        + capped(metrics.watchers, WATCHER_CEILING, WATCHER_WEIGHT);

    total.round() as u8
}

/// Points for how recently the repository was pushed to.
pub fn recency_points(days_since_push: i64) -> u8 {
    RECENCY_BUCKETS
        .iter()
        .find(|(max_days, _)| days_since_push <= *max_days)
        .map_or(BUCKET_FLOOR, |(_, points)| *points)
}

/// Points for how few issues are open.
pub fn issue_points(open_issues: u64) -> u8 {
    ISSUE_BUCKETS
        .iter()
        .find(|(max_issues, _)| open_issues <= *max_issues)
        .map_or(BUCKET_FLOOR, |(_, points)| *points)
}

/// Maintenance score in `10..=100` from whole days since the last push and the
/// open issue count.
pub fn maintenance_score_from(days_since_push: i64, open_issues: u64) -> u8 {
    recency_points(days_since_push) + issue_points(open_issues)
}

/// Maintenance score in `10..=100`, measuring push recency against `now`.
pub fn maintenance_score(metrics: &RawMetrics, now: DateTime<Utc>) -> u8 {
    let days = (now - metrics.last_push).num_days();
    maintenance_score_from(days, metrics.open_issues)
}
