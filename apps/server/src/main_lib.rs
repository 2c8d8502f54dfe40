use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{CacheBackendKind, Config, LogFormat};
use carvalue_cache_redis::RedisCacheStore;
use carvalue_core::cache::{CacheBackend, InMemoryCacheStore, NoopCacheStore, ResultCache};
use carvalue_core::valuation::{ValuationService, ValuationServiceTrait};
use carvalue_core::vehicles::ListingRepositoryTrait;
use carvalue_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, DbPool, ListingRepository, SqliteCacheStore,
    WriteHandle,
};

pub struct AppState {
    pub valuation_service: Arc<dyn ValuationServiceTrait>,
    pub listing_repository: Arc<dyn ListingRepositoryTrait>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Opens the database, applies migrations and starts the writer actor.
pub fn open_database(db_path: &str) -> anyhow::Result<(Arc<DbPool>, WriteHandle)> {
    let db_path = init(db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());
    Ok((pool, writer))
}

async fn build_cache_backend(
    config: &Config,
    pool: &Arc<DbPool>,
    writer: &WriteHandle,
) -> Arc<dyn CacheBackend> {
    match config.cache_backend {
        CacheBackendKind::Sqlite => Arc::new(SqliteCacheStore::new(pool.clone(), writer.clone())),
        CacheBackendKind::Redis => match RedisCacheStore::connect(config.redis.clone()).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("Redis cache unavailable, estimates will not be cached: {}", e);
                Arc::new(NoopCacheStore)
            }
        },
        CacheBackendKind::Memory => Arc::new(InMemoryCacheStore::new()),
        CacheBackendKind::None => Arc::new(NoopCacheStore),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = open_database(&config.db_path)?;

    let listing_repository = Arc::new(ListingRepository::new(pool.clone(), writer.clone()));
    let cache_backend = build_cache_backend(config, &pool, &writer).await;
    tracing::info!("Estimate cache backend: {:?}", config.cache_backend);

    let valuation_service = Arc::new(ValuationService::new(
        listing_repository.clone(),
        ResultCache::new(cache_backend),
        config.valuation.clone(),
    ));

    Ok(Arc::new(AppState {
        valuation_service,
        listing_repository,
    }))
}
