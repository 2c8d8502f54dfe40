use async_trait::async_trait;

use super::cache_errors::CacheError;

/// Key-value store of opaque blobs keyed by fingerprint string.
///
/// No TTL or size bound is imposed here; eviction, if any, belongs to the
/// backing store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
}
