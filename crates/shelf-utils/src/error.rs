use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PathError {
    #[error("Path is empty")]
    #[diagnostic(code(shelf_utils::path::empty))]
    Empty,

    #[error("Failed to get current directory: {source}")]
    #[diagnostic(code(shelf_utils::path::current_dir))]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable `{var}` not set in `{input}`")]
    #[diagnostic(
        code(shelf_utils::path::missing_env),
        help("Export `{var}` or use an absolute path")
    )]
    MissingEnvVar { var: String, input: String },

    #[error("Unclosed variable expression starting at `{input}`")]
    #[diagnostic(code(shelf_utils::path::unclosed_variable))]
    UnclosedVariable { input: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum LockError {
    #[error("Failed to acquire lock: {0}")]
    #[diagnostic(
        code(shelf_utils::lock::acquire),
        help("Check permissions of the database directory")
    )]
    AcquireFailed(String),

    #[error(transparent)]
    #[diagnostic(code(shelf_utils::lock::io))]
    Io(#[from] std::io::Error),
}

#[derive(Error, Diagnostic, Debug)]
pub enum UtilsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lock(#[from] LockError),
}

pub type PathResult<T> = std::result::Result<T, PathError>;
pub type LockResult<T> = std::result::Result<T, LockError>;
pub type UtilsResult<T> = std::result::Result<T, UtilsError>;
