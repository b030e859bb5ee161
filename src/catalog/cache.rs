//! In-memory response cache with TTL
//!
//! The cache is process-wide and keyed by operation + argument tuple, never
//! by conversation. It holds the raw parsed JSON body of successful catalog
//! responses; typed records are rebuilt from it on every hit. A separate
//! TTL-less map caches table-id lookups shared by the column and lineage
//! operations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

/// TTL cache for raw catalog responses plus the table-id lookup cache.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    table_ids: Mutex<HashMap<String, u64>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            table_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a cached response. Expired entries are removed and treated as
    /// misses — an invalid entry is never returned.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                log::debug!("cache hit: {}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response. Concurrent writers to the same key race with
    /// last-write-wins, which is fine: both hold the same remote fact.
    pub fn put(&self, key: &str, value: Value) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
        log::debug!("cache set: {}", key);
    }

    pub fn table_id(&self, key: &str) -> Option<u64> {
        self.table_ids.lock().unwrap().get(key).copied()
    }

    pub fn put_table_id(&self, key: &str, id: u64) {
        self.table_ids.lock().unwrap().insert(key.to_string(), id);
    }

    /// Drop everything, including cached table ids.
    pub fn flush(&self) {
        self.entries.lock().unwrap().clear();
        self.table_ids.lock().unwrap().clear();
        log::info!("catalog cache flushed");
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Deterministic cache key from operation name + ordered argument tuple.
pub fn cache_key(op: &str, args: &[&str]) -> String {
    let mut key = String::from(op);
    for arg in args {
        key.push(':');
        key.push_str(arg);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_is_deterministic() {
        assert_eq!(cache_key("list_tables", &["59", "analytics"]), "list_tables:59:analytics");
        assert_eq!(cache_key("list_data_sources", &[]), "list_data_sources");
    }

    #[test]
    fn test_cache_key_argument_independence() {
        let a = cache_key("list_schemas", &["1"]);
        let b = cache_key("list_schemas", &["2"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k", json!({"v": 1}));
        assert_eq!(cache.get("k"), Some(json!({"v": 1})));
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_removed() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put("k", json!(1));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_distinct_keys_do_not_share_slots() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("get_table_metadata:1:a:t", json!("first"));
        cache.put("get_table_metadata:1:b:t", json!("second"));
        assert_eq!(cache.get("get_table_metadata:1:a:t"), Some(json!("first")));
        assert_eq!(cache.get("get_table_metadata:1:b:t"), Some(json!("second")));
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k", json!("old"));
        cache.put("k", json!("new"));
        assert_eq!(cache.get("k"), Some(json!("new")));
    }

    #[test]
    fn test_table_id_cache() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        assert!(cache.table_id("1:analytics:customers").is_none());
        cache.put_table_id("1:analytics:customers", 4711);
        assert_eq!(cache.table_id("1:analytics:customers"), Some(4711));
    }

    #[test]
    fn test_flush_clears_both_caches() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k", json!(1));
        cache.put_table_id("t", 2);
        cache.flush();
        assert!(cache.get("k").is_none());
        assert!(cache.table_id("t").is_none());
    }
}
