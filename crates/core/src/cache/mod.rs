//! Result cache - query fingerprints, backend trait, and the best-effort cache wrapper.

mod cache_errors;
mod cache_traits;
mod fingerprint;
mod memory_store;
mod result_cache;

pub use cache_errors::CacheError;
pub use cache_traits::CacheBackend;
pub use fingerprint::QueryFingerprint;
pub use memory_store::{InMemoryCacheStore, NoopCacheStore};
pub use result_cache::ResultCache;
