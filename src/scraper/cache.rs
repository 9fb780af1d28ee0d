//! File-based cache with TTL support.
//!
//! Caching is best-effort: read and write failures degrade to a miss or a
//! no-op and are never surfaced to the caller. Stale entries are treated as
//! misses without being deleted (lazy expiry).

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Validity window for ordinary cache entries.
const CACHE_TTL_HOURS: i64 = 1;

/// Window during which a failed probe suppresses re-probing the host.
const RECENTLY_FAILED_MINUTES: i64 = 5;

const CONNECTION_STATUS_KEY: &str = "connection-status";
const RECENTLY_FAILED_KEY: &str = "source-recently-failed";

/// Cache entry with timestamp
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// File-based cache, one JSON record per key
pub struct Cache {
    base_dir: PathBuf,
    enabled: bool,
}

impl Cache {
    pub fn new(base_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Encode a logical key into a filesystem-safe token. The encoding is
    /// reversible: every byte outside `[A-Za-z0-9._-]` becomes `%XX`.
    fn sanitize_key(key: &str) -> String {
        let mut out = String::with_capacity(key.len());
        for b in key.bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                    out.push(b as char)
                }
                _ => out.push_str(&format!("%{:02X}", b)),
            }
        }
        out
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", Self::sanitize_key(key)))
    }

    /// Get cached data if present and fresh. Expired and missing entries are
    /// identical misses; the stale file is left in place.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_ttl(key, Duration::hours(CACHE_TTL_HOURS))
    }

    /// Get with an explicit TTL, used by the short-lived reachability markers.
    pub fn get_with_ttl<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let path = self.cache_path(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return None,
        };
        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                // Corrupt record, e.g. from a crash mid-write. Self-heals on
                // the next successful put.
                debug!("discarding unreadable cache record {}: {}", key, e);
                return None;
            }
        };

        let elapsed = Utc::now() - entry.cached_at;
        if elapsed > ttl {
            return None;
        }

        Some(entry.data)
    }

    /// Store data under a key. Failures are logged and swallowed.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        if let Err(e) = self.write_entry(key, &entry) {
            debug!("cache write for {} failed: {}", key, e);
        }
    }

    fn write_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        let content = serde_json::to_string_pretty(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(self.cache_path(key), content)
    }

    /// Record the last known reachability of the source host.
    pub fn set_connection_status(&self, reachable: bool) {
        self.put(CONNECTION_STATUS_KEY, &reachable);
        if !reachable {
            self.put(RECENTLY_FAILED_KEY, &true);
        }
    }

    /// Last known reachability, if still within the ordinary TTL.
    pub fn connection_status(&self) -> Option<bool> {
        self.get(CONNECTION_STATUS_KEY)
    }

    /// Whether a probe failed within the last few minutes. Used to avoid
    /// hammering a known-down host.
    pub fn source_recently_failed(&self) -> bool {
        self.get_with_ttl::<bool>(RECENTLY_FAILED_KEY, Duration::minutes(RECENTLY_FAILED_MINUTES))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> Cache {
        Cache::new(dir.path(), true)
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        let value = vec!["a".to_string(), "b".to_string()];
        cache.put("events", &value);
        let read: Option<Vec<String>> = cache.get("events");
        assert_eq!(read, Some(value));
    }

    #[test]
    fn test_missing_key_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let read: Option<Vec<String>> = cache.get("never-written");
        assert!(read.is_none());
    }

    #[test]
    fn test_expired_entry_is_miss_but_kept_on_disk() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        // Write an entry back-dated past the TTL.
        let entry = CacheEntry {
            data: 42u32,
            cached_at: Utc::now() - Duration::hours(2),
        };
        cache.write_entry("stale", &entry).unwrap();

        let read: Option<u32> = cache.get("stale");
        assert!(read.is_none());
        // Lazy expiry: the file is not deleted.
        assert!(cache.cache_path("stale").exists());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let dir = TempDir::new().unwrap();
        let cache = Cache::new(dir.path(), false);

        cache.put("key", &1u32);
        let read: Option<u32> = cache.get("key");
        assert!(read.is_none());
        assert!(!cache.cache_path("key").exists());
    }

    #[test]
    fn test_corrupt_record_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(cache.cache_path("bad"), "{ not json").unwrap();
        let read: Option<u32> = cache.get("bad");
        assert!(read.is_none());
    }

    #[test]
    fn test_key_sanitization_is_filesystem_safe() {
        let encoded = Cache::sanitize_key("results/midnaeturhlaup?race=2&cat=overall");
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('?'));
        assert!(!encoded.contains('&'));
        assert_eq!(Cache::sanitize_key("plain-key_1.0"), "plain-key_1.0");
        // Distinct keys never collide.
        assert_ne!(Cache::sanitize_key("a/b"), Cache::sanitize_key("a_b"));
    }

    #[test]
    fn test_recently_failed_marker() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        assert!(!cache.source_recently_failed());
        cache.set_connection_status(false);
        assert!(cache.source_recently_failed());
        assert_eq!(cache.connection_status(), Some(false));

        // Back-date the marker past its five-minute window.
        let entry = CacheEntry {
            data: true,
            cached_at: Utc::now() - Duration::minutes(6),
        };
        cache.write_entry(RECENTLY_FAILED_KEY, &entry).unwrap();
        assert!(!cache.source_recently_failed());
    }

    #[test]
    fn test_connection_status_recovers() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        cache.set_connection_status(false);
        cache.set_connection_status(true);
        assert_eq!(cache.connection_status(), Some(true));
    }
}
