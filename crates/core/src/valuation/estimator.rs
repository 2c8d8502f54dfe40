//! Estimation engine: impute, fit, predict, and guard.

use crate::constants::POLYNOMIAL_DEGREE;
use crate::valuation::imputation::impute_columns;
use crate::valuation::regression::{FitDiagnostics, PolynomialFeatures, PolynomialRegression};
use crate::valuation::ValuationError;
use crate::vehicles::VehicleRecord;

/// Where the returned estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Regression,
    /// The regression prediction was implausible; mean comparable price used.
    MeanFallback,
}

/// Detailed engine output. Only `value` leaves the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEstimate {
    pub value: f64,
    pub raw_prediction: f64,
    pub source: PriceSource,
    pub diagnostics: FitDiagnostics,
}

/// Refits a polynomial regression on every call; no model is kept between requests.
#[derive(Debug, Clone, Copy)]
pub struct PriceEstimator {
    features: PolynomialFeatures,
}

impl Default for PriceEstimator {
    fn default() -> Self {
        Self::new(POLYNOMIAL_DEGREE)
    }
}

impl PriceEstimator {
    pub fn new(degree: usize) -> Self {
        Self {
            features: PolynomialFeatures::new(degree),
        }
    }

    pub fn estimate(
        &self,
        records: &[VehicleRecord],
        query_year: f64,
        query_mileage: f64,
    ) -> Result<PriceEstimate, ValuationError> {
        let columns = impute_columns(records)?;

        if columns.len() < self.features.len() {
            log::debug!(
                "Fitting {} features on {} comparables; the fit is under-determined",
                self.features.len(),
                columns.len()
            );
        }

        let model = PolynomialRegression::fit(
            &columns.years,
            &columns.mileages,
            &columns.prices,
            self.features,
        )?;

        // Naive in-sample benchmark, no held-out set.
        let fitted = model.predict_many(&columns.years, &columns.mileages);
        let diagnostics = FitDiagnostics::compute(&columns.prices, &fitted, model.rank());
        log::info!(
            "Fit on {} comparables: RMSE = {:.2}, avg. off by = {:.2}",
            diagnostics.samples,
            diagnostics.rmse,
            diagnostics.mae
        );

        let raw_prediction = model.predict(query_year, query_mileage);
        let max_price = columns.max_price();

        if !raw_prediction.is_finite() || raw_prediction < 0.0 || raw_prediction > max_price {
            let mean_price = columns.mean_price();
            log::info!(
                "Prediction {:.2} outside [0, {:.2}]; falling back to mean price {:.2}",
                raw_prediction,
                max_price,
                mean_price
            );
            return Ok(PriceEstimate {
                value: mean_price,
                raw_prediction,
                source: PriceSource::MeanFallback,
                diagnostics,
            });
        }

        Ok(PriceEstimate {
            value: raw_prediction,
            raw_prediction,
            source: PriceSource::Regression,
            diagnostics,
        })
    }
}

/// Estimates a price for `(query_year, query_mileage)` from the comparables.
///
/// The result is unrounded.
pub fn estimate_price(
    records: &[VehicleRecord],
    query_year: f64,
    query_mileage: f64,
) -> Result<f64, ValuationError> {
    PriceEstimator::default()
        .estimate(records, query_year, query_mileage)
        .map(|estimate| estimate.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: f64, mileage: f64, price: f64) -> VehicleRecord {
        VehicleRecord::new(
            Some(year),
            "Ford",
            "Focus",
            Some(mileage),
            Some(price),
            "Tampa, FL",
        )
    }

    /// Price depends linearly on year only; mileage varies independently.
    fn linear_in_year() -> Vec<VehicleRecord> {
        let years = [2010.0, 2011.0, 2012.0, 2013.0, 2014.0, 2015.0, 2016.0, 2017.0];
        let mileages = [
            52000.0, 47000.0, 61000.0, 33000.0, 38000.0, 21000.0, 26000.0, 12000.0,
        ];
        years
            .iter()
            .zip(mileages)
            .map(|(&year, mileage)| record(year, mileage, 1000.0 * (year - 2005.0)))
            .collect()
    }

    #[test]
    fn test_interpolates_within_observed_range() {
        let records = vec![
            record(2018.0, 30000.0, 20000.0),
            record(2019.0, 25000.0, 22000.0),
            record(2017.0, 40000.0, 18000.0),
            record(2020.0, 15000.0, 25000.0),
            record(2016.0, 50000.0, 16000.0),
        ];

        let estimate = estimate_price(&records, 2019.0, 28000.0).unwrap();

        assert!(
            (18000.0..=25000.0).contains(&estimate),
            "estimate {} outside observed range",
            estimate
        );
    }

    #[test]
    fn test_in_range_prediction_is_returned_unmodified() {
        let estimate = PriceEstimator::default()
            .estimate(&linear_in_year(), 2014.5, 30000.0)
            .unwrap();

        assert_eq!(estimate.source, PriceSource::Regression);
        assert!((estimate.value - 9500.0).abs() < 1e-6);
        assert_eq!(estimate.value, estimate.raw_prediction);
    }

    #[test]
    fn test_negative_prediction_falls_back_to_mean_price() {
        let estimate = PriceEstimator::default()
            .estimate(&linear_in_year(), 1990.0, 30000.0)
            .unwrap();

        assert!(estimate.raw_prediction < 0.0);
        assert_eq!(estimate.source, PriceSource::MeanFallback);
        assert_eq!(estimate.value, 8500.0);
    }

    #[test]
    fn test_prediction_above_max_price_falls_back_to_mean_price() {
        let estimate = PriceEstimator::default()
            .estimate(&linear_in_year(), 2040.0, 10000.0)
            .unwrap();

        assert!(estimate.raw_prediction > 12000.0);
        assert_eq!(estimate.source, PriceSource::MeanFallback);
        assert_eq!(estimate.value, 8500.0);
    }

    #[test]
    fn test_fallback_mean_uses_imputed_prices() {
        let mut records = linear_in_year();
        records.push(VehicleRecord::new(
            Some(2013.5),
            "Ford",
            "Focus",
            Some(30000.0),
            None,
            "Tampa, FL",
        ));

        let estimate = PriceEstimator::default()
            .estimate(&records, 1990.0, 30000.0)
            .unwrap();

        // Imputing the missing price with the column mean leaves the mean unchanged.
        assert_eq!(estimate.source, PriceSource::MeanFallback);
        assert!((estimate.value - 8500.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_price_column_is_an_imputation_failure() {
        let records: Vec<VehicleRecord> = linear_in_year()
            .into_iter()
            .map(|mut r| {
                r.price = None;
                r
            })
            .collect();

        let err = estimate_price(&records, 2014.0, 30000.0).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::ImputationFailure { column: "price" }
        ));
    }

    #[test]
    fn test_diagnostics_reflect_in_sample_fit() {
        let estimate = PriceEstimator::default()
            .estimate(&linear_in_year(), 2014.0, 30000.0)
            .unwrap();

        assert_eq!(estimate.diagnostics.samples, 8);
        assert!(estimate.diagnostics.rmse < 1e-6);
        assert!(estimate.diagnostics.mae < 1e-6);
    }
}
