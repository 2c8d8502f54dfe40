//! SQLite-backed estimate cache.

mod model;
mod repository;

pub use model::EstimateCacheDB;
pub use repository::SqliteCacheStore;
