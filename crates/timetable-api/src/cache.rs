//! Per-key cache with a single time-to-live and lazy eviction.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::Clock;

/// Default TTL for discovery results (1 hour).
pub const DEFAULT_DISCOVERY_TTL: Duration = Duration::from_secs(60 * 60);

/// Default TTL for live-data results (5 minutes).
pub const DEFAULT_LIVE_TTL: Duration = Duration::from_secs(5 * 60);

/// Builds a deterministic cache key from an operation name and its
/// effective parameters.
///
/// Example: `cache_key("events", &[("semesterProgramId", 7), ("year", 2024)])`
/// yields `"events:semesterProgramId=7:year=2024"`.
#[must_use]
pub fn cache_key(operation: &str, params: &[(&str, i64)]) -> String {
    let mut key = String::from(operation);
    for (name, value) in params {
        // Writing into a String cannot fail.
        let _ = write!(key, ":{name}={value}");
    }
    key
}

/// Stored payload plus its write time.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: DateTime<Utc>,
}

/// Key/value store whose entries expire `ttl` after they were written.
///
/// Expired entries are dropped when read; [`ExpiringCache::clear_expired`]
/// evicts them in bulk. There is no size bound.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ExpiringCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ExpiringCache<T> {
    /// Creates an empty cache.
    ///
    /// A TTL too large for `chrono` saturates to the maximum representable span.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns a clone of the value for `key` if it is still fresh.
    ///
    /// A stale entry is removed as a side effect.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let fresh = {
            let entry = self.entries.get(key)?;
            self.is_fresh(entry, now)
        };
        if fresh {
            return self.entries.get(key).map(|e| e.value.clone());
        }
        self.entries.remove(key);
        tracing::trace!(key, "cache entry expired");
        None
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
        };
        self.entries.insert(key.into(), entry);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every entry whose TTL has elapsed.
    pub fn clear_expired(&mut self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| Self::elapsed(entry, now) < ttl);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired cache entries");
        }
    }

    /// Number of entries currently held (stale ones included until evicted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        Self::elapsed(entry, now) < self.ttl
    }

    fn elapsed(entry: &CacheEntry<T>, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(entry.created_at)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;

    fn make_cache<T: Clone>(ttl_secs: u64) -> (ExpiringCache<T>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
        ));
        let cache = ExpiringCache::new(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_get_returns_fresh_value() {
        // Arrange
        let (mut cache, clock) = make_cache(60);
        cache.set("periods", vec![1, 2, 3]);

        // Act
        clock.advance(TimeDelta::seconds(59));
        let value = cache.get("periods");

        // Assert
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_get_at_exact_ttl_is_absent_and_evicts() {
        // Arrange
        let (mut cache, clock) = make_cache(60);
        cache.set("periods", 1_u32);

        // Act
        clock.advance(TimeDelta::seconds(60));
        let value = cache.get("periods");

        // Assert
        assert_eq!(value, None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_slot_can_be_refilled() {
        // Arrange
        let (mut cache, clock) = make_cache(10);
        cache.set("k", "old");
        clock.advance(TimeDelta::seconds(11));
        assert_eq!(cache.get("k"), None);

        // Act
        cache.set("k", "new");

        // Assert
        assert_eq!(cache.get("k"), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_overwrites_and_refreshes_timestamp() {
        // Arrange
        let (mut cache, clock) = make_cache(60);
        cache.set("k", 1_u8);
        clock.advance(TimeDelta::seconds(50));

        // Act
        cache.set("k", 2_u8);
        clock.advance(TimeDelta::seconds(50));

        // Assert: 100s after the first write, 50s after the second
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_false_is_a_cached_value() {
        // Arrange
        let (mut cache, _clock) = make_cache(60);

        // Act
        cache.set("published:semesterProgramId=3", false);

        // Assert
        assert_eq!(cache.get("published:semesterProgramId=3"), Some(false));
        assert_eq!(cache.get("published:semesterProgramId=4"), None);
    }

    #[test]
    fn test_clear_expired_keeps_fresh_entries() {
        // Arrange
        let (mut cache, clock) = make_cache(60);
        cache.set("old", 1_u8);
        clock.advance(TimeDelta::seconds(45));
        cache.set("young", 2_u8);
        clock.advance(TimeDelta::seconds(30));

        // Act
        cache.clear_expired();

        // Assert
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("young"), Some(2));
    }

    #[test]
    fn test_clear_removes_everything() {
        // Arrange
        let (mut cache, _clock) = make_cache(60);
        cache.set("a", 1_u8);
        cache.set("b", 2_u8);

        // Act
        cache.clear();

        // Assert
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_zero_ttl_never_serves() {
        // Arrange
        let (mut cache, _clock) = make_cache(0);

        // Act
        cache.set("k", 1_u8);

        // Assert
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_ttl_accessor() {
        // Arrange & Act
        let (cache, _clock) = make_cache::<u8>(300);

        // Assert
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        // Arrange & Act
        let a = cache_key("events", &[("semesterProgramId", 7), ("year", 2024), ("month", 5)]);
        let b = cache_key("events", &[("semesterProgramId", 7), ("year", 2024), ("month", 5)]);
        let c = cache_key("events", &[("semesterProgramId", 7), ("year", 2024), ("month", 6)]);

        // Assert
        assert_eq!(a, "events:semesterProgramId=7:year=2024:month=5");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cache_key_without_params() {
        // Arrange & Act
        let key = cache_key("periods", &[]);

        // Assert
        assert_eq!(key, "periods");
    }
}
