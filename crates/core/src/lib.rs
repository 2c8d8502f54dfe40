//! CarValue Core - Domain entities, services, and traits.
//!
//! This crate contains the valuation logic: comparable retrieval contracts,
//! the regression estimator, result caching and the bulk listing importer.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `cache-redis` crates.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod import;
pub mod valuation;
pub mod vehicles;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
