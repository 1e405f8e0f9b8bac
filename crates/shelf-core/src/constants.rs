//! Constants used throughout shelf-core.

/// Lock file guarding the metrics sync, relative to the db directory.
pub const SYNC_LOCK_FILE: &str = "sync.lock";

/// Per-entry failure message when no metrics could be fetched.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch repository metrics";

/// Number of recently synced entries shown by `stats`.
pub const RECENT_SYNCS_LIMIT: i64 = 5;
