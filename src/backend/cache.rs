//! Query Cache
//!
//! In-memory TTL cache for read-mostly responses (snippet lists, folder
//! lists, stats). Entries expire lazily: an expired entry is dropped when it
//! is read, and `purge_expired` sweeps the rest from a background task.
//! Writers invalidate by glob pattern, e.g. `snippets:{user_id}:*`.
//!
//! The cache is per-process. There is no capacity limit; the TTL bounds
//! growth.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Map of key to value with a per-entry deadline
#[derive(Debug)]
pub struct TtlCache<V> {
    default_ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Match `key` against a glob where `*` matches any run of characters
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();
    let (mut p, mut k) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            resume = k;
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some(star_at) = star {
            p = star_at + 1;
            resume += 1;
            k = resume;
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Fetch a live entry; an expired one is evicted and counts as a miss
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                self.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every key matching `pattern`; returns how many were removed
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !glob_match(pattern, key));
        before - self.entries.len()
    }

    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Shared JSON response cache used by the handlers
#[derive(Debug, Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<TtlCache<serde_json::Value>>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TtlCache::new(ttl))),
        }
    }

    /// Typed read; an entry that no longer deserializes is treated as a miss
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.inner.lock().get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::debug!("cache hit: {}", key);
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!("dropping undecodable cache entry {}: {}", key, e);
                self.inner.lock().invalidate(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.inner.lock().set(key, json),
            Err(e) => tracing::warn!("value not cached: {}", e),
        }
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.lock().invalidate(key);
    }

    pub fn invalidate_pattern(&self, pattern: &str) {
        let removed = self.inner.lock().invalidate_pattern(pattern);
        if removed > 0 {
            tracing::debug!("invalidated {} cache entries matching {}", removed, pattern);
        }
    }

    pub fn purge_expired(&self) -> usize {
        self.inner.lock().purge_expired()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }
}

/// Cache keys shared by the handlers that read and the ones that invalidate
pub mod keys {
    use uuid::Uuid;

    pub fn snippet_list(user_id: Uuid, query: &impl serde::Serialize) -> String {
        let query = serde_json::to_string(query).unwrap_or_default();
        format!("snippets:{}:{}", user_id, query)
    }

    pub fn snippets_of(user_id: Uuid) -> String {
        format!("snippets:{}:*", user_id)
    }

    pub fn folders(user_id: Uuid) -> String {
        format!("folders:{}", user_id)
    }

    pub fn stats(user_id: Uuid) -> String {
        format!("stats:{}", user_id)
    }

    pub const ADMIN_STATS: &str = "admin:stats";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("snippets:*", "snippets:abc:{}"));
        assert!(glob_match("snippets:abc:*", "snippets:abc:"));
        assert!(glob_match("*:stats", "admin:stats"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(!glob_match("snippets:abc:*", "snippets:abd:1"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_set_get_and_stats() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(
            cache.stats(),
            CacheStats { hits: 1, misses: 1, entries: 1 }
        );
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("short", "v", Duration::ZERO);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("short"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("dead", 1, Duration::ZERO);
        cache.set("alive", 2);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get("alive"), Some(2));
    }

    #[test]
    fn test_invalidate_pattern_scopes_to_user() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set("snippets:u1:{\"q\":null}", 1);
        cache.set("snippets:u1:{\"q\":\"x\"}", 2);
        cache.set("snippets:u2:{}", 3);
        cache.set("folders:u1", 4);

        assert_eq!(cache.invalidate_pattern("snippets:u1:*"), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("snippets:u2:{}"), Some(3));
    }

    #[test]
    fn test_query_cache_round_trips_typed_values() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.set("k", &vec!["rust".to_string()]);
        let got: Option<Vec<String>> = cache.get("k");
        assert_eq!(got, Some(vec!["rust".to_string()]));

        let wrong: Option<u32> = cache.get("k");
        assert_eq!(wrong, None);
        assert_eq!(cache.stats().entries, 0);
    }
}
