//! Redis cache backend for CarValue.
//!
//! Stores estimate payloads under `<prefix>:<fingerprint>` with plain
//! `GET`/`SET`. Entries never expire unless a TTL is configured.
//!
//! # Example
//!
//! ```rust,no_run
//! use carvalue_cache_redis::{RedisCacheConfig, RedisCacheStore};
//!
//! # async fn example() -> Result<(), carvalue_core::cache::CacheError> {
//! let config = RedisCacheConfig::from_host("localhost", 6379, 0);
//! let store = RedisCacheStore::connect(config).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use carvalue_core::cache::{CacheBackend, CacheError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

pub const DEFAULT_KEY_PREFIX: &str = "carvalue:estimate";

/// Connection settings for the Redis cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisCacheConfig {
    pub url: String,
    pub key_prefix: String,
    /// `None` keeps entries until evicted by Redis itself.
    pub ttl: Option<Duration>,
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: None,
        }
    }

    /// Builds the URL from host, port and logical database number.
    pub fn from_host(host: &str, port: u16, db: i64) -> Self {
        Self::new(format!("redis://{}:{}/{}", host, port, db))
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    fn key(&self, fingerprint: &str) -> String {
        if self.key_prefix.is_empty() {
            fingerprint.to_string()
        } else {
            format!("{}:{}", self.key_prefix, fingerprint)
        }
    }
}

/// Cache backend shared by every worker through one Redis instance.
#[derive(Clone)]
pub struct RedisCacheStore {
    config: RedisCacheConfig,
    connection: ConnectionManager,
}

impl RedisCacheStore {
    /// Opens a managed connection; it reconnects on its own after failures.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.url.as_str()).map_err(to_cache_error)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(to_cache_error)?;
        log::info!("Connected to Redis estimate cache at {}", redact(&config.url));
        Ok(Self { config, connection })
    }

    pub fn config(&self) -> &RedisCacheConfig {
        &self.config
    }
}

#[async_trait]
impl CacheBackend for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<Vec<u8>>>(self.config.key(key))
            .await
            .map_err(to_cache_error)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let redis_key = self.config.key(key);
        let result = match self.config.ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(&redis_key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(&redis_key, value).await,
        };
        result.map_err(to_cache_error)
    }
}

/// Failures are reported to the caller only; the result cache logs them.
fn to_cache_error(err: RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout()
    {
        CacheError::Unavailable(err.to_string())
    } else {
        CacheError::Backend(err.to_string())
    }
}

/// Hides the password part of a Redis URL for logging.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
