//! Short-lived read-through cache for dashboard listings.
//!
//! Entries are keyed by actor and query parameters and expire after a fixed
//! TTL measured against the engine clock. Any successful write drops every
//! entry. A generation counter stops a listing that raced with a write from
//! storing its stale result.

use crate::task::{
    domain::{StaffId, TaskBuckets},
    ports::PageCursor,
};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default time to live of a cached listing.
pub const DEFAULT_LIST_CACHE_TTL: Duration = Duration::from_secs(60);
/// Default entry bound.
pub const DEFAULT_LIST_CACHE_MAX_ENTRIES: usize = 1_024;

/// Identifies one listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListCacheKey {
    actor: StaffId,
    page_size: usize,
    cursor: Option<PageCursor>,
}

impl ListCacheKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(actor: StaffId, page_size: usize, cursor: Option<PageCursor>) -> Self {
        Self {
            actor,
            page_size,
            cursor,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedListing {
    buckets: TaskBuckets,
    expires_at: DateTime<Utc>,
}

/// TTL cache of listing results.
#[derive(Debug)]
pub struct TaskListCache {
    entries: DashMap<ListCacheKey, CachedListing>,
    generation: AtomicU64,
    ttl: Duration,
    max_entries: usize,
    enabled: bool,
}

impl TaskListCache {
    /// Creates an enabled cache.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            ttl,
            max_entries: max_entries.max(1),
            enabled: true,
        }
    }

    /// Creates a cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Duration::ZERO, 1)
        }
    }

    /// Returns `true` when the cache stores entries.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the current write generation. Capture it before reading the
    /// repository and pass it to [`TaskListCache::insert`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns a live entry.
    #[must_use]
    pub fn get(&self, key: &ListCacheKey, now: DateTime<Utc>) -> Option<TaskBuckets> {
        if !self.enabled {
            return None;
        }
        let hit = self
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.buckets.clone());
        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        hit
    }

    /// Stores a listing unless a write happened since `generation` was
    /// observed.
    pub fn insert(
        &self,
        key: ListCacheKey,
        buckets: TaskBuckets,
        now: DateTime<Utc>,
        generation: u64,
    ) {
        if !self.enabled || self.generation() != generation {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.retain(|_, entry| entry.expires_at > now);
            if self.entries.len() >= self.max_entries {
                self.entries.clear();
            }
        }
        let expires_at = TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(
            key,
            CachedListing {
                buckets,
                expires_at,
            },
        );
    }

    /// Drops every entry.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    /// Number of stored entries, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TaskListCache {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_CACHE_TTL, DEFAULT_LIST_CACHE_MAX_ENTRIES)
    }
}
