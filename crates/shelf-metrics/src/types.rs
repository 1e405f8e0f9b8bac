use chrono::{DateTime, Utc};

/// Counters reported by the metrics provider for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub last_push: DateTime<Utc>,
}
