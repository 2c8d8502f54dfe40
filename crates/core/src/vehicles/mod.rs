//! Vehicles module - listing models, query validation, and the record store trait.

mod vehicles_model;
mod vehicles_traits;


pub use vehicles_model::{
    parse_numeric_field, ComparableFilter, EstimateQuery, ListingRow, MatchMode, NewListing,
    VehicleRecord,
};
pub use vehicles_traits::ListingRepositoryTrait;
