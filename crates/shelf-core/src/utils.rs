//! Utility functions for shelf-core.

use std::{fs, path::PathBuf};

use chrono::{SecondsFormat, Utc};
use shelf_config::config::get_config;

use crate::{error::ErrorContext, ShelfResult};

/// Creates the database directory if it does not exist yet.
pub fn setup_required_paths() -> ShelfResult<PathBuf> {
    let db_path = get_config().get_db_path()?;
    if !db_path.exists() {
        fs::create_dir_all(&db_path)
            .with_context(|| format!("creating database directory {}", db_path.display()))?;
    }
    Ok(db_path)
}

/// Current time as an RFC 3339 UTC timestamp with second precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn test_now_timestamp_is_rfc3339_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
