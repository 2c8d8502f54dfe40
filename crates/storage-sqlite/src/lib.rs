//! SQLite storage implementation for CarValue.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `carvalue-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The listing repository and the SQLite cache backend
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!            core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod cache;
pub mod db;
pub mod errors;
pub mod listings;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use cache::SqliteCacheStore;
pub use listings::ListingRepository;

// Re-export from carvalue-core for convenience
pub use carvalue_core::errors::{DatabaseError, Error, Result};
