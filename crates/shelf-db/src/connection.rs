//! Database connection management.
//!
//! The catalog lives in a single SQLite file. Every connection enables foreign
//! key enforcement and runs the embedded migrations before it is handed out.

use std::path::Path;

use diesel::{sql_query, Connection, RunQueryDsl, SqliteConnection};
use tracing::debug;

use crate::{
    error::{DbError, Result},
    migration::apply_migrations,
};

/// File name of the catalog database inside the configured db directory.
pub const CATALOG_DB_FILE: &str = "catalog.db";

/// Database connection wrapper with migration support.
pub struct DbConnection {
    conn: SqliteConnection,
}

impl DbConnection {
    /// Opens the database at `path`, creating it if needed, and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, a pragma cannot be applied or a
    /// migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "opening catalog database");
        let mut conn = SqliteConnection::establish(&path.to_string_lossy())?;

        sql_query("PRAGMA journal_mode = WAL;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        sql_query("PRAGMA busy_timeout = 5000;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        Self::prepare(conn)
    }

    /// Opens a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = SqliteConnection::establish(":memory:")?;
        Self::prepare(conn)
    }

    fn prepare(mut conn: SqliteConnection) -> Result<Self> {
        sql_query("PRAGMA foreign_keys = ON;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        apply_migrations(&mut conn).map_err(|e| DbError::MigrationError(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Gets a mutable reference to the underlying connection.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl std::ops::Deref for DbConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl std::ops::DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use diesel::{sql_types::Integer, QueryableByName};
    use tempfile::tempdir;

    use super::*;
    use crate::repository::category::CategoryRepository;

    #[derive(QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn test_open_in_memory_has_schema() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let categories = CategoryRepository::list_all(db.conn()).unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let pragma: Pragma = sql_query("PRAGMA foreign_keys;")
            .get_result(db.conn())
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);
    }

    #[test]
    fn test_open_creates_file_and_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CATALOG_DB_FILE);

        {
            let _db = DbConnection::open(&path).unwrap();
        }
        assert!(path.exists());

        let mut db = DbConnection::open(&path).unwrap();
        assert!(CategoryRepository::list_all(db.conn()).unwrap().is_empty());
    }
}
