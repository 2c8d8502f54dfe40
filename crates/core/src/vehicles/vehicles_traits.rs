use crate::errors::Result;
use crate::vehicles::vehicles_model::{ComparableFilter, ListingRow, NewListing};
use async_trait::async_trait;

/// Trait for the record store holding historical listings
#[async_trait]
pub trait ListingRepositoryTrait: Send + Sync {
    /// Fetches listings for a make/model, in store order.
    fn find_comparables(
        &self,
        make: &str,
        model: &str,
        filter: &ComparableFilter,
    ) -> Result<Vec<ListingRow>>;

    /// Inserts a batch of listings atomically and returns the number inserted.
    async fn insert_listings(&self, listings: Vec<NewListing>) -> Result<usize>;

    fn count_listings(&self) -> Result<i64>;
}
