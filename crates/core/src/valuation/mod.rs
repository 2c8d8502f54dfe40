//! Valuation module - estimation engine, pipeline orchestrator, and models.

mod estimator;
mod imputation;
mod regression;
mod valuation_errors;
mod valuation_model;
mod valuation_service;
mod valuation_traits;

#[cfg(test)]
mod valuation_service_tests;

pub use estimator::{estimate_price, PriceEstimate, PriceEstimator, PriceSource};
pub use imputation::{impute_columns, ImputedColumns};
pub use regression::{FitDiagnostics, PolynomialFeatures, PolynomialRegression};
pub use valuation_errors::ValuationError;
pub use valuation_model::{EstimateOutcome, EstimationResult, ValuationConfig};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
