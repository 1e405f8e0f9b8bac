//! Shared state handed to every catalog operation.

use std::{path::PathBuf, sync::Arc};

use shelf_config::config::Config;
use shelf_core::{constants::SYNC_LOCK_FILE, database::connection::DieselDatabase, ShelfResult};
use shelf_events::EventSinkHandle;
use shelf_metrics::{github::GithubClient, http_client::ClientConfig, MetricsSource};
use tracing::debug;

/// Configuration, store handle, metrics source and event sink for one run.
///
/// Cloning is cheap; clones share the same database connection.
#[derive(Clone)]
pub struct ShelfContext {
    config: Arc<Config>,
    events: EventSinkHandle,
    db: DieselDatabase,
    source: Arc<dyn MetricsSource>,
    lock_dir: PathBuf,
}

impl ShelfContext {
    /// Opens the catalog database and builds the GitHub metrics client from
    /// `config`.
    pub fn open(config: Config, events: EventSinkHandle) -> ShelfResult<Self> {
        let db_dir = config.get_db_path()?;
        debug!(db_dir = %db_dir.display(), "opening shelf context");
        let db = DieselDatabase::open(&db_dir)?;

        let client_config = ClientConfig {
            user_agent: Some(config.user_agent().to_string()),
            timeout: Some(config.request_timeout()),
        };
        let source = GithubClient::new(
            config.github_api_url(),
            config.github_token(),
            &client_config,
        );

        Ok(Self::with_parts(
            config,
            events,
            db,
            Arc::new(source),
            db_dir,
        ))
    }

    /// Assembles a context from already constructed parts.
    ///
    /// `lock_dir` is where the sync lock file is created.
    pub fn with_parts(
        config: Config,
        events: EventSinkHandle,
        db: DieselDatabase,
        source: Arc<dyn MetricsSource>,
        lock_dir: PathBuf,
    ) -> Self {
        Self {
            config: Arc::new(config),
            events,
            db,
            source,
            lock_dir,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }

    pub fn db(&self) -> &DieselDatabase {
        &self.db
    }

    pub fn metrics_source(&self) -> Arc<dyn MetricsSource> {
        self.source.clone()
    }

    pub fn sync_lock_path(&self) -> PathBuf {
        self.lock_dir.join(SYNC_LOCK_FILE)
    }

    /// Releases the database handle held by this context.
    pub fn close(self) {
        self.db.close();
    }
}
