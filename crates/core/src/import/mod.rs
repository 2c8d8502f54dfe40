//! Bulk loading of pipe-delimited listing exports into the listing store.

mod import_model;
mod import_service;


pub use import_model::{parse_listing_record, ImportSummary, LISTING_COLUMN_COUNT};
pub use import_service::ListingImportService;
