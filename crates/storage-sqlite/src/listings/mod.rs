//! SQLite storage implementation for historical vehicle listings.

mod model;
mod repository;

pub use model::{ListingDB, NewListingDB};
pub use repository::ListingRepository;
