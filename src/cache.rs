//! Named TTL cache.

use moka::sync::Cache;
use std::hash::Hash;
use std::time::Duration;

/// Bounded cache whose entries expire a fixed time after insertion.
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
    name: String,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given parameters.
    pub fn new(name: impl Into<String>, max_capacity: u64, ttl: Duration) -> Self {
        let name = name.into();
        let inner = Cache::builder()
            .name(&name)
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, name }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Insert only when the key is absent. Returns true when this call inserted.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        self.inner.entry(key).or_insert(value).is_fresh()
    }

    /// Remove and return an entry.
    pub fn take(&self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    /// Approximate entry count after pending maintenance has run.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
