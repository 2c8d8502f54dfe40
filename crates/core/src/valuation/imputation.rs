//! Column-mean imputation over a comparable set.

use crate::valuation::ValuationError;
use crate::vehicles::VehicleRecord;

/// The (year, mileage, price) columns of a comparable set with every missing
/// value replaced by its column mean.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedColumns {
    pub years: Vec<f64>,
    pub mileages: Vec<f64>,
    pub prices: Vec<f64>,
}

impl ImputedColumns {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn max_price(&self) -> f64 {
        self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean_price(&self) -> f64 {
        mean(&self.prices)
    }
}

/// Imputes each column independently with the mean of its present values.
///
/// The means come from the given records only, never the whole table.
pub fn impute_columns(records: &[VehicleRecord]) -> Result<ImputedColumns, ValuationError> {
    Ok(ImputedColumns {
        years: impute_column(records.iter().map(|r| r.year), "year")?,
        mileages: impute_column(records.iter().map(|r| r.mileage), "mileage")?,
        prices: impute_column(records.iter().map(|r| r.price), "price")?,
    })
}

fn impute_column<I>(values: I, column: &'static str) -> Result<Vec<f64>, ValuationError>
where
    I: Iterator<Item = Option<f64>> + Clone,
{
    let (sum, count) = values
        .clone()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Err(ValuationError::ImputationFailure { column });
    }

    let column_mean = sum / count as f64;
    let filled: Vec<f64> = values.map(|v| v.unwrap_or(column_mean)).collect();

    let missing = filled.len() - count;
    if missing > 0 {
        log::debug!(
            "Imputed {} missing '{}' value(s) with column mean {:.3}",
            missing,
            column,
            column_mean
        );
    }
    Ok(filled)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
