//! Keyed query cache
//!
//! Holds the last successful result per [`QueryKey`] together with its
//! freshness. Concurrent fetches for the same key are coalesced: the first
//! caller runs the fetcher while the others wait on the key's async lock
//! and then read the value it stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.0.len() >= prefix.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub stale_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    data: Value,
    fetched_at: Instant,
    stale_time: Duration,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < self.stale_time
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    locks: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    fetching: Mutex<HashMap<QueryKey, usize>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value when fresh, otherwise run `fetcher` once for all
    /// concurrent callers of this key.
    pub async fn fetch_query<F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        if let Some(data) = self.fresh_data(key) {
            return Ok(data);
        }

        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        // Someone else may have finished the fetch while we waited.
        if let Some(data) = self.fresh_data(key) {
            return Ok(data);
        }

        self.run(key, options, fetcher).await
    }

    /// Always run `fetcher`, after any fetch already in flight for the key.
    pub async fn refetch_query<F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;
        self.run(key, options, fetcher).await
    }

    async fn run<F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        let _fetching = FetchingGuard::enter(self, key);

        // Errors are not cached; previous data stays available.
        let data = fetcher().await?;
        self.entries.lock().insert(
            key.clone(),
            Entry {
                data: data.clone(),
                fetched_at: Instant::now(),
                stale_time: options.stale_time,
                invalidated: false,
            },
        );
        Ok(data)
    }

    pub fn get_query_data(&self, key: &QueryKey) -> Option<Value> {
        self.entries.lock().get(key).map(|e| e.data.clone())
    }

    /// Store `data` as if it had just been fetched.
    pub fn set_query_data(&self, key: &QueryKey, data: Value) {
        let mut entries = self.entries.lock();
        let stale_time = entries.get(key).map_or(Duration::ZERO, |e| e.stale_time);
        entries.insert(
            key.clone(),
            Entry {
                data,
                fetched_at: Instant::now(),
                stale_time,
                invalidated: false,
            },
        );
    }

    /// Mark stale; the data stays readable until the next fetch replaces it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            entry.invalidated = true;
        }
    }

    pub fn invalidate_prefix(&self, prefix: &[&str]) {
        for (key, entry) in self.entries.lock().iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
            }
        }
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.lock().remove(key);
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.fetching.lock().get(key).is_some_and(|n| *n > 0)
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.lock().get(key).is_none_or(|e| !e.is_fresh())
    }

    fn fresh_data(&self, key: &QueryKey) -> Option<Value> {
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.is_fresh())
            .map(|e| e.data.clone())
    }

    fn key_lock(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(key.clone()).or_default().clone()
    }
}

/// Counts a running fetch; decrements on drop so a cancelled fetch does
/// not leave the key marked as fetching.
struct FetchingGuard<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
}

impl<'a> FetchingGuard<'a> {
    fn enter(cache: &'a QueryCache, key: &'a QueryKey) -> Self {
        *cache.fetching.lock().entry(key.clone()).or_insert(0) += 1;
        Self { cache, key }
    }
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        let mut fetching = self.cache.fetching.lock();
        if let Some(n) = fetching.get_mut(self.key) {
            *n -= 1;
            if *n == 0 {
                fetching.remove(self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> QueryKey {
        QueryKey::new(["/api/auth/user"])
    }

    fn fresh_for(minutes: u64) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(minutes * 60),
        }
    }

    #[tokio::test]
    async fn test_fresh_value_is_served_from_cache() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .fetch_query(&key(), fresh_for(5), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"id": 1}))
                })
                .await
                .unwrap();
            assert_eq!(value, json!({"id": 1}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .fetch_query(&key(), QueryOptions::default(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Null)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_data_but_forces_fetch() {
        let cache = QueryCache::new();
        cache
            .fetch_query(&key(), fresh_for(5), || async { Ok(json!("old")) })
            .await
            .unwrap();

        cache.invalidate(&key());
        assert!(cache.is_stale(&key()));
        assert_eq!(cache.get_query_data(&key()), Some(json!("old")));

        let value = cache
            .fetch_query(&key(), fresh_for(5), || async { Ok(json!("new")) })
            .await
            .unwrap();
        assert_eq!(value, json!("new"));
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let k = key();
        let fetch = || {
            cache.fetch_query(&k, fresh_for(5), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(json!({"id": 7}))
            })
        };

        let (a, b, c) = tokio::join!(fetch(), fetch(), fetch());
        assert_eq!(a.unwrap(), json!({"id": 7}));
        assert_eq!(b.unwrap(), json!({"id": 7}));
        assert_eq!(c.unwrap(), json!({"id": 7}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new();
        cache.set_query_data(&key(), json!("kept"));
        cache.invalidate(&key());

        let err = cache
            .fetch_query(&key(), fresh_for(5), || async {
                Err(ClientError::Network("down".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(cache.get_query_data(&key()), Some(json!("kept")));
        assert!(!cache.is_fetching(&key()));
    }

    #[tokio::test]
    async fn test_refetch_ignores_freshness() {
        let cache = QueryCache::new();
        cache
            .fetch_query(&key(), fresh_for(5), || async { Ok(json!(1)) })
            .await
            .unwrap();
        let value = cache
            .refetch_query(&key(), fresh_for(5), || async { Ok(json!(2)) })
            .await
            .unwrap();
        assert_eq!(value, json!(2));
    }

    #[tokio::test]
    async fn test_is_fetching_during_fetch() {
        let cache = QueryCache::new();
        let observed = cache
            .fetch_query(&key(), fresh_for(5), || async {
                Ok(json!(cache.is_fetching(&key())))
            })
            .await
            .unwrap();
        assert_eq!(observed, json!(true));
        assert!(!cache.is_fetching(&key()));
    }

    #[test]
    fn test_invalidate_prefix_and_remove() {
        let cache = QueryCache::new();
        let events = QueryKey::new(["/api/events"]);
        let event = QueryKey::new(["/api/events", "42"]);
        let user = key();
        for k in [&events, &event, &user] {
            cache.set_query_data(k, json!(true));
        }

        cache.invalidate_prefix(&["/api/events"]);
        assert!(cache.is_stale(&events));
        assert!(cache.is_stale(&event));
        assert_eq!(cache.get_query_data(&event), Some(json!(true)));

        cache.remove(&user);
        assert_eq!(cache.get_query_data(&user), None);
    }
}
