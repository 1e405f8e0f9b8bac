use crate::types::RawMetrics;

/// Something that can report [`RawMetrics`] for a repository source URL.
pub trait MetricsSource: Send + Sync {
    /// Fetches the metrics for `source_url`.
    ///
    /// Returns `None` when the URL does not name a repository or the provider
    /// could not deliver usable data. Implementations never panic on bad input.
    fn fetch(&self, source_url: &str) -> Option<RawMetrics>;
}
