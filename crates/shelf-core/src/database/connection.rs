//! Database connection management.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use diesel::Connection as DieselConnection;
use shelf_db::{
    connection::{DbConnection, CATALOG_DB_FILE},
    error::DbError,
};
use tracing::debug;

use crate::error::ShelfError;

type Result<T> = std::result::Result<T, ShelfError>;

/// Thread-safe handle to the catalog database.
///
/// The handle is opened explicitly and released with [`DieselDatabase::close`]
/// or by dropping the last clone.
pub struct DieselDatabase {
    conn: Arc<Mutex<DbConnection>>,
    path: Option<PathBuf>,
}

impl DieselDatabase {
    /// Opens the catalog database inside `db_dir`, creating it if needed.
    pub fn open<P: AsRef<Path>>(db_dir: P) -> Result<Self> {
        let path = db_dir.as_ref().join(CATALOG_DB_FILE);
        let conn = DbConnection::open(&path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Opens a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DbConnection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets a mutable reference to the underlying connection.
    /// Locks the mutex and returns a guard.
    pub fn conn(&self) -> Result<std::sync::MutexGuard<'_, DbConnection>> {
        self.conn.lock().map_err(|_| ShelfError::PoisonError)
    }

    /// Executes a function with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> diesel::QueryResult<T>,
    {
        let mut conn = self.conn()?;
        f(conn.conn()).map_err(|e| ShelfError::Database(DbError::from(e)))
    }

    /// Executes a function within a transaction.
    ///
    /// The closure may fail with any error convertible from a diesel error, so
    /// operations can abort the transaction with their own error variants.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> Result<T>,
    {
        let mut conn = self.conn()?;
        conn.conn().transaction(f)
    }

    /// Releases this handle.
    ///
    /// The connection itself is closed once no other clone holds it.
    pub fn close(self) {
        match Arc::try_unwrap(self.conn) {
            Ok(conn) => {
                drop(conn);
                debug!(path = ?self.path, "closed catalog database");
            }
            Err(_) => debug!("catalog database still shared, releasing handle"),
        }
    }
}

impl Clone for DieselDatabase {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use shelf_db::{models::catalog::NewCategory, repository::category::CategoryRepository};
    use tempfile::tempdir;

    use super::*;

    fn insert_category(db: &DieselDatabase, slug: &str) -> Result<i32> {
        db.with_conn(|conn| {
            CategoryRepository::insert(
                conn,
                &NewCategory {
                    name: slug,
                    slug,
                    created_at: "2025-01-01T00:00:00Z",
                    updated_at: "2025-01-01T00:00:00Z",
                },
            )
        })
    }

    #[test]
    fn test_open_creates_catalog_file() {
        let dir = tempdir().unwrap();
        let db = DieselDatabase::open(dir.path().join("db")).unwrap();
        let path = db.path().unwrap().to_path_buf();
        assert!(path.ends_with(CATALOG_DB_FILE));
        assert!(path.exists());
        db.close();
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        let db = DieselDatabase::open(dir.path()).unwrap();
        insert_category(&db, "state").unwrap();
        db.close();

        let db = DieselDatabase::open(dir.path()).unwrap();
        let count = db.with_conn(CategoryRepository::count).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_clones_share_connection() {
        let db = DieselDatabase::open_in_memory().unwrap();
        let other = db.clone();
        insert_category(&db, "state").unwrap();
        db.close();

        assert_eq!(other.with_conn(CategoryRepository::count).unwrap(), 1);
        assert!(other.path().is_none());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = DieselDatabase::open_in_memory().unwrap();
        let result: Result<()> = db.transaction(|conn| {
            CategoryRepository::insert(
                conn,
                &NewCategory {
                    name: "State",
                    slug: "state",
                    created_at: "2025-01-01T00:00:00Z",
                    updated_at: "2025-01-01T00:00:00Z",
                },
            )?;
            Err(ShelfError::Validation("abort".into()))
        });
        assert!(matches!(result, Err(ShelfError::Validation(_))));
        assert_eq!(db.with_conn(CategoryRepository::count).unwrap(), 0);
    }

    #[test]
    fn test_unique_violation_is_database_error() {
        let db = DieselDatabase::open_in_memory().unwrap();
        insert_category(&db, "state").unwrap();
        let err = insert_category(&db, "state").unwrap_err();
        assert!(matches!(err, ShelfError::Database(_)));
    }
}
