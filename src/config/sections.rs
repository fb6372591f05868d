//! Configuration sections.

use crate::task::services::{
    DEFAULT_LIST_CACHE_MAX_ENTRIES, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE,
    DEFAULT_STAFF_TABLE, DEFAULT_TASK_TABLE,
};
use serde::{Deserialize, Serialize};

/// Table names in the record repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Task table.
    pub tasks: String,
    /// Staff table.
    pub staff: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            tasks: DEFAULT_TASK_TABLE.to_owned(),
            staff: DEFAULT_STAFF_TABLE.to_owned(),
        }
    }
}

/// Call timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Bound on each repository call.
    pub repository_ms: u64,
    /// Bound on each audit or notification call.
    pub side_effect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            repository_ms: 10_000,
            side_effect_ms: 10_000,
        }
    }
}

/// Listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListCacheConfig {
    /// Whether listings are cached at all.
    pub enabled: bool,
    /// Entry time to live, in seconds.
    pub ttl_secs: u64,
    /// Entry bound.
    pub max_entries: usize,
}

impl Default for ListCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
            max_entries: DEFAULT_LIST_CACHE_MAX_ENTRIES,
        }
    }
}

/// Listing page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Page size when the caller gives none.
    pub default_page_size: usize,
    /// Largest page size a caller may request.
    pub max_page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// `PostgreSQL` connection settings. Without a URL the in-memory repository
/// is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 8,
        }
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}
