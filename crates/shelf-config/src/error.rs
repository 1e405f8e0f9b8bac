use miette::Diagnostic;
use shelf_utils::error::{PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(shelf_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(shelf_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(shelf_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid GitHub API URL: {0}")]
    #[diagnostic(
        code(shelf_config::invalid_api_url),
        help("Use an absolute URL such as https://api.github.com")
    )]
    InvalidApiUrl(String),

    #[error("Invalid request timeout: {0}")]
    #[diagnostic(
        code(shelf_config::invalid_timeout),
        help("Use a duration such as 30s, 1m or 1m30s")
    )]
    InvalidTimeout(String),

    #[error("`{0}` must be greater than zero")]
    #[diagnostic(code(shelf_config::invalid_limit))]
    InvalidLimit(&'static str),

    #[error("IO error: {0}")]
    #[diagnostic(code(shelf_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(shelf_config::utils))]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(shelf_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(shelf_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
