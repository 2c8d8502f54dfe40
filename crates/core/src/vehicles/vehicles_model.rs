//! Vehicle listing domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

/// Raw listing row as returned by the record store.
///
/// Numeric columns are kept as loosely typed text: historical imports contain
/// empty strings and NULLs where a value was never captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub year: Option<String>,
    pub make: String,
    pub mileage: Option<String>,
    pub model: String,
    pub price: Option<String>,
    pub location: Option<String>,
}

/// One historical listing with its numeric columns parsed.
///
/// `None` marks a missing value. It is never coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub year: Option<f64>,
    pub make: String,
    pub model: String,
    pub mileage: Option<f64>,
    pub price: Option<f64>,
    pub location: String,
}

impl VehicleRecord {
    pub fn new(
        year: Option<f64>,
        make: impl Into<String>,
        model: impl Into<String>,
        mileage: Option<f64>,
        price: Option<f64>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
            mileage,
            price,
            location: location.into(),
        }
    }
}

impl From<ListingRow> for VehicleRecord {
    fn from(row: ListingRow) -> Self {
        Self {
            year: parse_numeric_field(row.year.as_deref()),
            mileage: parse_numeric_field(row.mileage.as_deref()),
            price: parse_numeric_field(row.price.as_deref()),
            make: row.make,
            model: row.model,
            location: row.location.unwrap_or_default(),
        }
    }
}

/// Parses a loosely typed numeric column.
///
/// Absent values, blank strings and values that do not parse to a finite
/// number are all reported as missing.
pub fn parse_numeric_field(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            log::debug!("Treating unparseable numeric value '{}' as missing", trimmed);
            None
        }
    }
}

/// Input model for inserting a listing into the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub year: String,
    pub make: String,
    pub model: String,
    pub mileage: String,
    pub price: String,
    pub location: String,
}

/// A validated estimation request.
///
/// Construction goes through [`EstimateQuery::new`] or [`EstimateQuery::parse`],
/// so mileage and year are always finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateQuery {
    make: String,
    model: String,
    mileage: f64,
    year: f64,
}

impl EstimateQuery {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        mileage: f64,
        year: f64,
    ) -> Result<Self> {
        let make = ensure_present("make", make.into())?;
        let model = ensure_present("model", model.into())?;
        let mileage = ensure_non_negative("mileage", mileage, &mileage.to_string())?;
        let year = ensure_non_negative("year", year, &year.to_string())?;
        Ok(Self {
            make,
            model,
            mileage,
            year,
        })
    }

    /// Validates raw form input; both numbers must parse as non-negative.
    pub fn parse(make: &str, model: &str, mileage: &str, year: &str) -> Result<Self> {
        let make = ensure_present("make", make.to_string())?;
        let model = ensure_present("model", model.to_string())?;
        let mileage = parse_non_negative("mileage", mileage)?;
        let year = parse_non_negative("year", year)?;
        Ok(Self {
            make,
            model,
            mileage,
            year,
        })
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    pub fn year(&self) -> f64 {
        self.year
    }
}

/// Make and model are matched verbatim but must not be blank.
fn ensure_present(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    Ok(value)
}

fn parse_non_negative(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| not_non_negative(field, raw))?;
    ensure_non_negative(field, value, raw)
}

fn ensure_non_negative(field: &str, value: f64, raw: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(not_non_negative(field, raw));
    }
    // -0.0 passes the check above; fold it so equal queries stay equal.
    Ok(if value == 0.0 { 0.0 } else { value })
}

fn not_non_negative(field: &str, raw: &str) -> Error {
    Error::Validation(ValidationError::NotNonNegative {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// How make/model are matched when retrieving comparables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    #[default]
    Exact,
    CaseInsensitive,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "EXACT",
            MatchMode::CaseInsensitive => "CASE_INSENSITIVE",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "EXACT" => Ok(MatchMode::Exact),
            "CASE_INSENSITIVE" | "ICASE" => Ok(MatchMode::CaseInsensitive),
            other => Err(Error::InvalidConfigValue(format!(
                "Unknown match mode '{}'",
                other
            ))),
        }
    }
}

/// Retrieval filter for comparable listings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableFilter {
    pub match_mode: MatchMode,
    /// Upper bound on the number of rows fetched; `None` fetches every match.
    pub retrieval_limit: Option<usize>,
}
