use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use shelf_utils::{
    path::{resolve_path, xdg_config_home, xdg_data_home},
    time::parse_std_duration,
};
use toml_edit::DocumentMut;
use tracing::info;
use url::Url;

use crate::{
    annotations::annotate_toml_table,
    display::DisplaySettings,
    error::{ConfigError, Result},
};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_TRENDING_LIMIT: usize = 6;
pub const DEFAULT_USER_AGENT: &str = concat!("shelf/", env!("CARGO_PKG_VERSION"));

const REDACTED: &str = "********";

/// Shelf configuration
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Directory holding the catalog database and the sync lock.
    /// Default: $XDG_DATA_HOME/shelf/db
    pub db_path: Option<String>,

    /// Base URL of the GitHub REST API used to fetch repository metrics.
    /// Default: https://api.github.com
    pub github_api_url: Option<String>,

    /// Token sent with GitHub API requests. Requests are made unauthenticated
    /// (with a lower rate limit) when unset.
    /// Falls back to $GITHUB_TOKEN, then $GH_TOKEN.
    pub github_token: Option<String>,

    /// Upper bound for a single metrics request, e.g. "30s" or "1m".
    /// Default: 30s
    pub request_timeout: Option<String>,

    /// User agent sent with metrics requests.
    /// Default: shelf/<version>
    pub user_agent: Option<String>,

    /// Limits the number of results returned by a search.
    /// Default: 20
    pub search_limit: Option<usize>,

    /// Number of entries listed as trending.
    /// Default: 6
    pub trending_limit: Option<usize>,

    /// Terminal output settings.
    pub display: Option<DisplaySettings>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("SHELF_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("shelf").join("config.toml"),
    })
});

/// Path of the configuration file in use.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

/// Points the configuration at a different file. Must be called before [`init`].
pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

/// Loads the configuration file into the process-wide slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    Ok(())
}

/// Returns the loaded configuration, or the defaults when [`init`] was never called.
pub fn get_config() -> Config {
    let mut guard = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(Config::default_config).clone()
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            db_path: Some(format!("{}/shelf/db", xdg_data_home().display())),
            github_api_url: Some(DEFAULT_GITHUB_API_URL.to_string()),
            github_token: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT.to_string()),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            search_limit: Some(DEFAULT_SEARCH_LIMIT),
            trending_limit: Some(DEFAULT_TRENDING_LIMIT),
            display: Some(DisplaySettings {
                icons: Some(true),
                colors: Some(true),
            }),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset fields with defaults and validates the rest.
    pub fn resolve(&mut self) -> Result<()> {
        let api_url = self
            .github_api_url
            .get_or_insert_with(|| DEFAULT_GITHUB_API_URL.to_string());
        let trimmed = api_url.trim().trim_end_matches('/');
        if trimmed.is_empty() || Url::parse(trimmed).is_err() {
            return Err(ConfigError::InvalidApiUrl(api_url.clone()));
        }
        *api_url = trimmed.to_string();

        let timeout = self
            .request_timeout
            .get_or_insert_with(|| DEFAULT_REQUEST_TIMEOUT.to_string());
        match parse_std_duration(timeout) {
            Some(duration) if !duration.is_zero() => {}
            _ => return Err(ConfigError::InvalidTimeout(timeout.clone())),
        }

        if *self.search_limit.get_or_insert(DEFAULT_SEARCH_LIMIT) == 0 {
            return Err(ConfigError::InvalidLimit("search_limit"));
        }
        if *self.trending_limit.get_or_insert(DEFAULT_TRENDING_LIMIT) == 0 {
            return Err(ConfigError::InvalidLimit("trending_limit"));
        }

        self.user_agent
            .get_or_insert_with(|| DEFAULT_USER_AGENT.to_string());
        self.display.get_or_insert_with(DisplaySettings::default);

        if self
            .github_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            self.github_token = None;
        }

        Ok(())
    }

    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("SHELF_DB") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(db_path) = &self.db_path {
            return Ok(resolve_path(db_path)?);
        }
        Ok(xdg_data_home().join("shelf").join("db"))
    }

    /// Credential for the metrics provider: the configured token, then
    /// `$GITHUB_TOKEN`, then `$GH_TOKEN`.
    pub fn github_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn github_api_url(&self) -> &str {
        self.github_api_url
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
            .as_deref()
            .and_then(parse_std_duration)
            .unwrap_or(Duration::from_secs(30))
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn trending_limit(&self) -> usize {
        self.trending_limit.unwrap_or(DEFAULT_TRENDING_LIMIT)
    }

    pub fn display(&self) -> DisplaySettings {
        self.display.clone().unwrap_or_default()
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.github_token.is_some() {
            config.github_token = Some(REDACTED.to_string());
        }
        config
    }

    pub fn save(&self) -> Result<()> {
        let config_path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(display_table) = doc.get_mut("display").and_then(|d| d.as_table_mut()) {
            annotate_toml_table::<DisplaySettings>(display_table, true)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated default configuration to [`CONFIG_PATH`].
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.github_api_url(), "https://api.github.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.search_limit(), 20);
        assert_eq!(config.trending_limit(), 6);
        assert!(config.github_token.is_none());
        assert!(config.user_agent().starts_with("shelf/"));
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve().unwrap();

        assert_eq!(config.github_api_url.as_deref(), Some(DEFAULT_GITHUB_API_URL));
        assert_eq!(config.request_timeout.as_deref(), Some("30s"));
        assert_eq!(config.search_limit, Some(20));
        assert_eq!(config.trending_limit, Some(6));
        assert!(config.display.is_some());
    }

    #[test]
    fn test_resolve_trims_api_url() {
        let mut config = Config::default_config();
        config.github_api_url = Some("http://127.0.0.1:8080/".to_string());
        config.resolve().unwrap();
        assert_eq!(config.github_api_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_resolve_rejects_invalid_api_url() {
        let mut config = Config::default_config();
        config.github_api_url = Some("not a url".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidApiUrl(_))));

        config.github_api_url = Some("   ".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidApiUrl(_))));
    }

    #[test]
    fn test_resolve_rejects_invalid_timeout() {
        let mut config = Config::default_config();
        config.request_timeout = Some("soon".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidTimeout(_))));

        config.request_timeout = Some("0s".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_resolve_rejects_zero_limits() {
        let mut config = Config::default_config();
        config.search_limit = Some(0);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidLimit("search_limit"))
        ));

        let mut config = Config::default_config();
        config.trending_limit = Some(0);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidLimit("trending_limit"))
        ));
    }

    #[test]
    fn test_resolve_drops_blank_token() {
        let mut config = Config::default_config();
        config.github_token = Some("  ".to_string());
        config.resolve().unwrap();
        assert!(config.github_token.is_none());
    }

    #[test]
    #[serial]
    fn test_github_token_precedence() {
        with_env(
            vec![("GITHUB_TOKEN", Some("env-token")), ("GH_TOKEN", Some("gh-token"))],
            || {
                let mut config = Config::default_config();
                assert_eq!(config.github_token().as_deref(), Some("env-token"));

                config.github_token = Some("file-token".to_string());
                assert_eq!(config.github_token().as_deref(), Some("file-token"));
            },
        );

        with_env(
            vec![("GITHUB_TOKEN", None), ("GH_TOKEN", Some("gh-token"))],
            || {
                let config = Config::default_config();
                assert_eq!(config.github_token().as_deref(), Some("gh-token"));
            },
        );

        with_env(vec![("GITHUB_TOKEN", None), ("GH_TOKEN", None)], || {
            assert!(Config::default_config().github_token().is_none());
        });
    }

    #[test]
    #[serial]
    fn test_db_path_env_override() {
        with_env(vec![("SHELF_DB", Some("/custom/db"))], || {
            let config = Config::default_config();
            assert_eq!(config.get_db_path().unwrap(), PathBuf::from("/custom/db"));
        });

        with_env(vec![("SHELF_DB", None)], || {
            let mut config = Config::default_config();
            config.db_path = Some("/srv/shelf".to_string());
            assert_eq!(config.get_db_path().unwrap(), PathBuf::from("/srv/shelf"));
        });
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut config = Config::default_config();
        config.github_token = Some("secret".to_string());

        let rendered = toml::to_string(&config.redacted()).unwrap();
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.search_limit, config.search_limit);
        assert_eq!(deserialized.github_api_url, config.github_api_url);
    }

    #[test]
    #[serial]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let previous = config_path();
        set_config_path(path.clone());

        let written = generate_default_config().unwrap();
        assert_eq!(written, path);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("github_api_url"));
        assert!(content.contains("# Limits the number of results returned by a search."));

        assert!(matches!(
            generate_default_config(),
            Err(ConfigError::ConfigAlreadyExists)
        ));

        let loaded = Config::new().unwrap();
        assert_eq!(loaded.search_limit(), 20);

        set_config_path(previous);
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let previous = config_path();
        set_config_path(dir.path().join("absent.toml"));

        let config = Config::new().unwrap();
        assert_eq!(config.trending_limit(), 6);

        set_config_path(previous);
    }
}
