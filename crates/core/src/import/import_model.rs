use csv::StringRecord;
use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::vehicles::NewListing;

/// Minimum number of columns a listing line must carry.
pub const LISTING_COLUMN_COUNT: usize = 12;

const YEAR_COLUMN: usize = 1;
const MAKE_COLUMN: usize = 2;
const MODEL_COLUMN: usize = 3;
const CITY_COLUMN: usize = 7;
const STATE_COLUMN: usize = 8;
const PRICE_COLUMN: usize = 10;
const MILEAGE_COLUMN: usize = 11;

/// Counters reported at the end of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub batches_committed: usize,
    pub batches_failed: usize,
    pub records_imported: usize,
    pub records_skipped: usize,
}

/// Maps one export line to a listing, transliterating every field to ASCII.
///
/// Returns `None` for lines with fewer than [`LISTING_COLUMN_COUNT`] columns.
pub fn parse_listing_record(record: &StringRecord) -> Option<NewListing> {
    if record.len() < LISTING_COLUMN_COUNT {
        return None;
    }
    let field = |index: usize| deunicode(record.get(index).unwrap_or_default().trim());

    Some(NewListing {
        year: field(YEAR_COLUMN),
        make: field(MAKE_COLUMN),
        model: field(MODEL_COLUMN),
        mileage: field(MILEAGE_COLUMN),
        price: field(PRICE_COLUMN),
        location: format!("{}, {}", field(CITY_COLUMN), field(STATE_COLUMN)),
    })
}
