//! Error types for shelf-db.

use diesel::result::DatabaseErrorKind;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(shelf_db::connection),
        help("Check if the database directory exists and is writable")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(shelf_db::query))]
    QueryError(String),

    #[error("Database migration failed: {0}")]
    #[diagnostic(
        code(shelf_db::migration),
        help("The database schema may be corrupted. Try moving the database aside and importing again.")
    )]
    MigrationError(String),

    #[error("Record not found")]
    #[diagnostic(code(shelf_db::not_found))]
    NotFound,

    #[error("Database integrity error: {0}")]
    #[diagnostic(
        code(shelf_db::integrity),
        help("A unique slug or category reference was violated")
    )]
    IntegrityError(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(shelf_db::io), help("Check file permissions and disk space"))]
    IoError(#[from] std::io::Error),
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DbError::NotFound,
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                info,
            ) => DbError::IntegrityError(info.message().to_string()),
            diesel::result::Error::DatabaseError(_, info) => {
                DbError::QueryError(info.message().to_string())
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<diesel::result::ConnectionError> for DbError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
