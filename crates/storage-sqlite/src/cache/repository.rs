use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use carvalue_core::cache::{CacheBackend, CacheError};
use carvalue_core::errors::{DatabaseError, Error};
use carvalue_core::Result;

use super::model::EstimateCacheDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::estimate_cache;

/// Cache backend storing estimate payloads in the `estimate_cache` table.
///
/// Entries never expire; a repeated key overwrites the stored payload.
pub struct SqliteCacheStore {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SqliteCacheStore {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        SqliteCacheStore { pool, writer }
    }

    fn load_payload(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = get_connection(&self.pool)?;
        estimate_cache::table
            .find(key)
            .select(estimate_cache::payload)
            .first::<Vec<u8>>(&mut conn)
            .optional()
            .into_core()
    }

    async fn store_payload(&self, key: String, value: Vec<u8>) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let entry = EstimateCacheDB {
                    fingerprint: key,
                    payload: value,
                    created_at: Utc::now().naive_utc(),
                };
                diesel::insert_into(estimate_cache::table)
                    .values(&entry)
                    .on_conflict(estimate_cache::fingerprint)
                    .do_update()
                    .set(&entry)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

fn to_cache_error(err: Error) -> CacheError {
    match err {
        Error::Database(DatabaseError::ConnectionFailed(e))
        | Error::Database(DatabaseError::PoolCreationFailed(e)) => CacheError::Unavailable(e),
        other => CacheError::Backend(other.to_string()),
    }
}

#[async_trait]
impl CacheBackend for SqliteCacheStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        self.load_payload(key).map_err(to_cache_error)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> std::result::Result<(), CacheError> {
        self.store_payload(key.to_string(), value)
            .await
            .map_err(to_cache_error)
    }
}
