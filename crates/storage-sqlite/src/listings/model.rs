//! Database models for vehicle listings.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use carvalue_core::vehicles::{ListingRow, NewListing};

/// Database model for a stored listing
#[derive(Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::price_datapoints)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ListingDB {
    pub id: i32,
    pub year: Option<String>,
    pub make: String,
    pub mileage: Option<String>,
    pub model: String,
    pub listing_price: Option<String>,
    pub location: Option<String>,
}

/// Database model for inserting a listing
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::price_datapoints)]
#[serde(rename_all = "camelCase")]
pub struct NewListingDB {
    pub year: Option<String>,
    pub make: String,
    pub mileage: Option<String>,
    pub model: String,
    pub listing_price: Option<String>,
    pub location: Option<String>,
}

impl From<ListingDB> for ListingRow {
    fn from(db: ListingDB) -> Self {
        Self {
            year: db.year,
            make: db.make,
            mileage: db.mileage,
            model: db.model,
            price: db.listing_price,
            location: db.location,
        }
    }
}

impl From<NewListing> for NewListingDB {
    fn from(domain: NewListing) -> Self {
        Self {
            year: Some(domain.year),
            make: domain.make,
            mileage: Some(domain.mileage),
            model: domain.model,
            listing_price: Some(domain.price),
            location: Some(domain.location),
        }
    }
}
