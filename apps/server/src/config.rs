use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use carvalue_cache_redis::{RedisCacheConfig, DEFAULT_KEY_PREFIX};
use carvalue_core::constants::{DEFAULT_MIN_RECORDS_REQUIRED, MAX_RETURNED_COMPARABLES};
use carvalue_core::valuation::ValuationConfig;
use carvalue_core::vehicles::{ComparableFilter, MatchMode};
use carvalue_storage_sqlite::get_db_path;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "./db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("Unknown log format '{}'", other),
        }
    }
}

/// Where estimation results are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Sqlite,
    Redis,
    Memory,
    None,
}

impl FromStr for CacheBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(CacheBackendKind::Sqlite),
            "redis" => Ok(CacheBackendKind::Redis),
            "memory" => Ok(CacheBackendKind::Memory),
            "none" | "off" => Ok(CacheBackendKind::None),
            other => bail!("Unknown cache backend '{}'", other),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    pub cache_backend: CacheBackendKind,
    pub redis: RedisCacheConfig,
    pub valuation: ValuationConfig,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr: SocketAddr = match (var("CV_LISTEN_ADDR"), var("APP_SERVER_PORT")) {
            (Some(addr), _) => addr
                .parse()
                .with_context(|| format!("Invalid CV_LISTEN_ADDR '{}'", addr))?,
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .with_context(|| format!("Invalid APP_SERVER_PORT '{}'", port))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => DEFAULT_LISTEN_ADDR.parse::<SocketAddr>()?,
        };

        let db_path = var("CV_DB_PATH").unwrap_or_else(|| get_db_path(DEFAULT_DATA_DIR));

        let cors_allow = var("CV_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let timeout_ms: u64 = parse_or(&var, "CV_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;

        let log_format = match var("CV_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::Text,
        };

        let cache_backend = match var("CV_CACHE_BACKEND") {
            Some(raw) => raw.parse::<CacheBackendKind>()?,
            None => CacheBackendKind::Sqlite,
        };

        let redis = {
            let base = match var("CV_REDIS_URL") {
                Some(url) => RedisCacheConfig::new(url),
                None => RedisCacheConfig::from_host(
                    &var("REDIS_HOST").unwrap_or_else(|| "localhost".into()),
                    parse_or(&var, "REDIS_PORT", 6379u16)?,
                    parse_or(&var, "REDIS_DB", 0i64)?,
                ),
            };
            let ttl = parse_optional::<u64, _>(&var, "CV_REDIS_TTL_SECS")?.map(Duration::from_secs);
            base.with_key_prefix(
                var("CV_REDIS_KEY_PREFIX").unwrap_or_else(|| DEFAULT_KEY_PREFIX.into()),
            )
            .with_ttl(ttl)
        };

        let min_records = match var("CV_MIN_RECORDS") {
            Some(_) => parse_or(&var, "CV_MIN_RECORDS", DEFAULT_MIN_RECORDS_REQUIRED)?,
            None => parse_or(
                &var,
                "MINIMUM_RECORDS_REQUIRED_FOR_PREDICTION",
                DEFAULT_MIN_RECORDS_REQUIRED,
            )?,
        };
        let max_comparables = parse_or(&var, "CV_MAX_COMPARABLES", MAX_RETURNED_COMPARABLES)?;
        let match_mode = match var("CV_MATCH_MODE") {
            Some(raw) => MatchMode::from_str(&raw)?,
            None => MatchMode::default(),
        };
        let retrieval_limit = parse_optional::<usize, _>(&var, "CV_RETRIEVAL_LIMIT")?;
        let valuation = ValuationConfig::new(
            min_records,
            max_comparables,
            ComparableFilter {
                match_mode,
                retrieval_limit,
            },
        )?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            log_format,
            cache_backend,
            redis,
            valuation,
        })
    }
}

fn parse_optional<T, F>(var: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid {} '{}'", key, raw))
        })
        .transpose()
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_optional(var, key)?.unwrap_or(default))
}
