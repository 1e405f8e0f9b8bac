use std::error::Error;

use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::debug;

pub const CATALOG_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs every pending catalog migration and returns how many were applied.
pub fn apply_migrations(
    conn: &mut SqliteConnection,
) -> Result<usize, Box<dyn Error + Send + Sync + 'static>> {
    let applied = conn.run_pending_migrations(CATALOG_MIGRATIONS)?;
    for version in &applied {
        debug!(version = %version, "applied migration");
    }
    Ok(applied.len())
}
