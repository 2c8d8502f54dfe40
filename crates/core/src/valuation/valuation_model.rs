//! Valuation domain models.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MIN_RECORDS_REQUIRED, MAX_RETURNED_COMPARABLES};
use crate::errors::{Error, Result};
use crate::valuation::ValuationError;
use crate::vehicles::{ComparableFilter, VehicleRecord};

/// Immutable configuration consumed by the valuation pipeline.
///
/// Loaded once at start-up and handed to [`crate::valuation::ValuationService::new`].
/// Deserialized values go through the same checks as [`ValuationConfig::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ValuationConfigFields")]
pub struct ValuationConfig {
    min_records_required: usize,
    max_returned_comparables: usize,
    comparable_filter: ComparableFilter,
}

impl ValuationConfig {
    pub fn new(
        min_records_required: usize,
        max_returned_comparables: usize,
        comparable_filter: ComparableFilter,
    ) -> Result<Self> {
        if min_records_required == 0 {
            return Err(Error::Valuation(ValuationError::InvalidConfig(
                "Minimum records required must be at least 1".to_string(),
            )));
        }
        if max_returned_comparables == 0 {
            return Err(Error::Valuation(ValuationError::InvalidConfig(
                "Returned comparables cap must be at least 1".to_string(),
            )));
        }
        if comparable_filter.retrieval_limit == Some(0) {
            return Err(Error::Valuation(ValuationError::InvalidConfig(
                "Retrieval limit must be at least 1 when set".to_string(),
            )));
        }
        Ok(Self {
            min_records_required,
            max_returned_comparables,
            comparable_filter,
        })
    }

    /// Default cap and filter with a custom threshold.
    pub fn with_min_records(min_records_required: usize) -> Result<Self> {
        Self::new(
            min_records_required,
            MAX_RETURNED_COMPARABLES,
            ComparableFilter::default(),
        )
    }

    pub fn min_records_required(&self) -> usize {
        self.min_records_required
    }

    pub fn max_returned_comparables(&self) -> usize {
        self.max_returned_comparables
    }

    pub fn comparable_filter(&self) -> &ComparableFilter {
        &self.comparable_filter
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValuationConfigFields {
    #[serde(default = "default_min_records")]
    min_records_required: usize,
    #[serde(default = "default_max_comparables")]
    max_returned_comparables: usize,
    #[serde(default)]
    comparable_filter: ComparableFilter,
}

fn default_min_records() -> usize {
    DEFAULT_MIN_RECORDS_REQUIRED
}

fn default_max_comparables() -> usize {
    MAX_RETURNED_COMPARABLES
}

impl TryFrom<ValuationConfigFields> for ValuationConfig {
    type Error = Error;

    fn try_from(fields: ValuationConfigFields) -> Result<Self> {
        Self::new(
            fields.min_records_required,
            fields.max_returned_comparables,
            fields.comparable_filter,
        )
    }
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            min_records_required: DEFAULT_MIN_RECORDS_REQUIRED,
            max_returned_comparables: MAX_RETURNED_COMPARABLES,
            comparable_filter: ComparableFilter::default(),
        }
    }
}

/// A price estimate and the comparables returned with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    /// Unrounded estimate; callers round for display.
    pub estimate: f64,
    /// At most `max_returned_comparables` listings, in retrieval order.
    pub comparables: Vec<VehicleRecord>,
}

impl EstimationResult {
    /// Nearest whole unit, ties to even.
    pub fn rounded_estimate(&self) -> i64 {
        self.estimate.round_ties_even() as i64
    }
}

/// Outcome of one pass through the valuation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateOutcome {
    Estimated(EstimationResult),
    /// Fewer comparables than the configured threshold; nothing was cached.
    InsufficientData { found: usize, required: usize },
}

impl EstimateOutcome {
    pub fn into_result(self) -> Option<EstimationResult> {
        match self {
            EstimateOutcome::Estimated(result) => Some(result),
            EstimateOutcome::InsufficientData { .. } => None,
        }
    }
}
