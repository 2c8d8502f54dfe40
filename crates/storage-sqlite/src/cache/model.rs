//! Database model for cached estimates.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Database model for one cached estimate payload
#[derive(Queryable, Insertable, Selectable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::estimate_cache)]
#[diesel(primary_key(fingerprint))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EstimateCacheDB {
    pub fingerprint: String,
    pub payload: Vec<u8>,
    pub created_at: NaiveDateTime,
}
