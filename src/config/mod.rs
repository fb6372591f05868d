//! Layered engine configuration using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `HIREFLOW_` prefix; `__` separates
//!    nested keys, so `HIREFLOW_LIST_CACHE__TTL_SECS` sets
//!    `list_cache.ttl_secs`.
//! 2. An optional TOML file.
//! 3. Built-in defaults.
//!
//! ```no_run
//! use hireflow::config::EngineConfig;
//! use std::path::Path;
//!
//! let config = EngineConfig::load(Some(Path::new("hireflow.toml")))?;
//! let settings = config.engine_settings();
//! # Ok::<(), hireflow::config::ConfigError>(())
//! ```

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{
    DatabaseConfig, ListCacheConfig, ListingConfig, TablesConfig, TelemetryConfig,
    TimeoutsConfig,
};

use crate::task::{
    adapters::postgres::{RecordPgPool, build_pool},
    ports::RecordRepositoryResult,
    services::{ClaimGuard, EngineSettings, TaskListCache},
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "HIREFLOW_";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Table names.
    pub tables: TablesConfig,
    /// Call timeouts.
    pub timeouts: TimeoutsConfig,
    /// Listing cache.
    pub list_cache: ListCacheConfig,
    /// Listing page sizes.
    pub listing: ListingConfig,
    /// Claim write strategy.
    pub claim_guard: ClaimGuard,
    /// Database connection.
    pub database: DatabaseConfig,
    /// Log output.
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    /// Loads and validates configuration from defaults, `file` and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be read or a
    /// value has the wrong type, and [`ConfigError::InvalidValue`] when a
    /// value is out of range.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Checks ranges the types cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables.tasks.trim().is_empty() {
            return Err(ConfigError::invalid("tables.tasks", "must not be empty"));
        }
        if self.tables.staff.trim().is_empty() {
            return Err(ConfigError::invalid("tables.staff", "must not be empty"));
        }
        if self.timeouts.repository_ms == 0 {
            return Err(ConfigError::invalid("timeouts.repository_ms", "must be positive"));
        }
        if self.timeouts.side_effect_ms == 0 {
            return Err(ConfigError::invalid("timeouts.side_effect_ms", "must be positive"));
        }
        if self.listing.default_page_size == 0 {
            return Err(ConfigError::invalid(
                "listing.default_page_size",
                "must be positive",
            ));
        }
        if self.listing.max_page_size < self.listing.default_page_size {
            return Err(ConfigError::invalid(
                "listing.max_page_size",
                format!(
                    "must be at least listing.default_page_size ({})",
                    self.listing.default_page_size
                ),
            ));
        }
        if self.list_cache.enabled && self.list_cache.ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "list_cache.ttl_secs",
                "must be positive while the cache is enabled",
            ));
        }
        if self
            .database
            .url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::invalid("database.url", "must not be blank"));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::invalid("database.pool_size", "must be positive"));
        }
        Ok(())
    }

    /// Engine settings described by this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            task_table: self.tables.tasks.trim().to_owned(),
            staff_table: self.tables.staff.trim().to_owned(),
            repository_timeout: Duration::from_millis(self.timeouts.repository_ms),
            side_effect_timeout: Duration::from_millis(self.timeouts.side_effect_ms),
            claim_guard: self.claim_guard,
            default_page_size: self.listing.default_page_size,
            max_page_size: self.listing.max_page_size,
        }
    }

    /// Listing cache described by this configuration.
    #[must_use]
    pub fn list_cache(&self) -> TaskListCache {
        if self.list_cache.enabled {
            return TaskListCache::new(
                Duration::from_secs(self.list_cache.ttl_secs),
                self.list_cache.max_entries,
            );
        }
        TaskListCache::disabled()
    }

    /// Connection pool for the configured database. `None` when no URL is
    /// set and the in-memory repository is expected.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::Persistence`](crate::task::ports::RecordRepositoryError::Persistence)
    /// when the pool cannot connect.
    pub fn record_pool(&self) -> RecordRepositoryResult<Option<RecordPgPool>> {
        self.database
            .url
            .as_deref()
            .map(|url| build_pool(url.trim(), self.database.pool_size))
            .transpose()
    }
}
