use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use carvalue_core::vehicles::{
    ComparableFilter, ListingRepositoryTrait, ListingRow, MatchMode, NewListing,
};
use carvalue_core::Result;

use super::model::{ListingDB, NewListingDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::price_datapoints;

const LIKE_ESCAPE: char = '\\';

pub struct ListingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ListingRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ListingRepository { pool, writer }
    }

    fn find_comparables_impl(
        &self,
        make: &str,
        model: &str,
        filter: &ComparableFilter,
    ) -> Result<Vec<ListingRow>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = price_datapoints::table
            .select(ListingDB::as_select())
            .into_boxed();

        query = match filter.match_mode {
            MatchMode::Exact => query
                .filter(price_datapoints::make.eq(make.to_string()))
                .filter(price_datapoints::model.eq(model.to_string())),
            // SQLite LIKE folds ASCII case; wildcards in the input match literally.
            MatchMode::CaseInsensitive => query
                .filter(
                    price_datapoints::make
                        .like(escape_like(make))
                        .escape(LIKE_ESCAPE),
                )
                .filter(
                    price_datapoints::model
                        .like(escape_like(model))
                        .escape(LIKE_ESCAPE),
                ),
        };

        query = query.order(price_datapoints::id.asc());
        if let Some(limit) = filter.retrieval_limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = query.load::<ListingDB>(&mut conn).into_core()?;
        log::debug!(
            "Retrieved {} listings for {} {} ({})",
            rows.len(),
            make,
            model,
            filter.match_mode
        );
        Ok(rows.into_iter().map(ListingRow::from).collect())
    }
}

/// Escapes LIKE wildcards so the value only matches itself.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ListingRepositoryTrait for ListingRepository {
    fn find_comparables(
        &self,
        make: &str,
        model: &str,
        filter: &ComparableFilter,
    ) -> Result<Vec<ListingRow>> {
        self.find_comparables_impl(make, model, filter)
    }

    async fn insert_listings(&self, listings: Vec<NewListing>) -> Result<usize> {
        if listings.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let rows: Vec<NewListingDB> =
                    listings.into_iter().map(NewListingDB::from).collect();
                Ok(diesel::insert_into(price_datapoints::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn count_listings(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        price_datapoints::table
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }
}
