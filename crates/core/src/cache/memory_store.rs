use async_trait::async_trait;
use dashmap::DashMap;

use super::cache_errors::CacheError;
use super::cache_traits::CacheBackend;

/// Process-local cache backend.
///
/// Entries are only visible to the process that wrote them; multi-worker
/// deployments should use a shared backend instead.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<String, Vec<u8>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Backend that never stores anything; every lookup is a miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheBackend for NoopCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
        Ok(())
    }
}
