//! Error types for shelf-core.

use miette::Diagnostic;
use shelf_config::error::ConfigError;
use shelf_db::error::DbError;
use shelf_utils::error::{LockError, PathError};
use thiserror::Error;

/// Core error type for catalog operations.
#[derive(Error, Diagnostic, Debug)]
pub enum ShelfError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    PathError(#[from] PathError),

    #[error("Error while {action}")]
    #[diagnostic(code(shelf::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    #[diagnostic(
        code(shelf::seed),
        help("Seed files contain [[categories]] and [[entries]] tables")
    )]
    SeedError(#[from] toml::de::Error),

    #[error("Entry not found")]
    #[diagnostic(
        code(shelf::entry_not_found),
        help("Run 'shelf list' to see available entries")
    )]
    EntryNotFound(String),

    #[error("Category '{0}' not found")]
    #[diagnostic(
        code(shelf::category_not_found),
        help("Run 'shelf category list' to see available categories")
    )]
    CategoryNotFound(String),

    #[error("Category '{slug}' is still used by {entries} entries")]
    #[diagnostic(
        code(shelf::category_in_use),
        help("Move or remove the entries in this category first")
    )]
    CategoryInUse { slug: String, entries: i64 },

    #[error("A {kind} with slug '{slug}' already exists")]
    #[diagnostic(code(shelf::duplicate_slug), help("Choose a different slug"))]
    DuplicateSlug { kind: &'static str, slug: String },

    #[error("{0}")]
    #[diagnostic(code(shelf::validation))]
    Validation(String),

    #[error("Another metrics sync is already running")]
    #[diagnostic(
        code(shelf::sync_in_progress),
        help("Wait for the running sync to finish and try again")
    )]
    SyncInProgress,

    #[error("Thread lock poison error")]
    #[diagnostic(
        code(shelf::poison),
        help("This is an internal error, please report it")
    )]
    PoisonError,

    #[error("{0}")]
    #[diagnostic(code(shelf::error))]
    Custom(String),
}

impl ShelfError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound(_) | Self::CategoryNotFound(_) | Self::Database(DbError::NotFound)
        )
    }
}

impl From<diesel::result::Error> for ShelfError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(DbError::from(err))
    }
}

impl<T> From<std::sync::PoisonError<T>> for ShelfError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::PoisonError
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, ShelfError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, ShelfError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            ShelfError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
