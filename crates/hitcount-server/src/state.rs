use std::sync::Arc;

use hitcount_core::{config::Config, StatsStore, StatsUpdater};
use hitcount_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Holds no per-request mutable data: the counters live in the store, so any
/// number of server instances can run against the same database.
pub struct AppState {
    /// Stats updater wired to the configured counting mode.
    pub updater: StatsUpdater,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct a new `AppState` wrapping the given backend and config.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self::with_store(Arc::new(db), config)
    }

    /// Construct state over any [`StatsStore`] implementation.
    pub fn with_store(store: Arc<dyn StatsStore>, config: Config) -> Self {
        Self {
            updater: StatsUpdater::new(store, config.counting_mode),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        self.updater.store()
    }
}
