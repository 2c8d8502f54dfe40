//! Property-based integration tests for the valuation pipeline.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use carvalue_core::cache::QueryFingerprint;
use carvalue_core::valuation::{estimate_price, PriceEstimator, PriceSource};
use carvalue_core::vehicles::{EstimateQuery, VehicleRecord};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Generates a fully populated listing with a plausible year, mileage and price.
fn arb_record() -> impl Strategy<Value = VehicleRecord> {
    (1990u32..2025, 0u32..300_000, 500u32..120_000).prop_map(|(year, mileage, price)| {
        VehicleRecord::new(
            Some(year as f64),
            "Toyota",
            "Corolla",
            Some(mileage as f64),
            Some(price as f64),
            "Austin, TX",
        )
    })
}

/// Generates a listing where mileage may be missing.
fn arb_sparse_record() -> impl Strategy<Value = VehicleRecord> {
    (arb_record(), any::<bool>()).prop_map(|(mut record, drop_mileage)| {
        if drop_mileage {
            record.mileage = None;
        }
        record
    })
}

/// Generates a validated query.
fn arb_query() -> impl Strategy<Value = EstimateQuery> {
    (
        "[A-Za-z]{1,12}",
        "[A-Za-z0-9][A-Za-z0-9 ]{0,11}",
        0u32..400_000,
        1950u32..2040,
    )
        .prop_map(|(make, model, mileage, year)| {
            EstimateQuery::new(make, model, mileage as f64, year as f64).unwrap()
        })
}

// =============================================================================
// Estimation properties
// =============================================================================

proptest! {
    /// The returned estimate is always within `[0, max observed price]`.
    #[test]
    fn prop_estimate_is_bounded_by_observed_prices(
        records in proptest::collection::vec(arb_record(), 1..30),
        query_year in 1950u32..2040,
        query_mileage in 0u32..400_000,
    ) {
        let max_price = records
            .iter()
            .filter_map(|r| r.price)
            .fold(f64::NEG_INFINITY, f64::max);

        let estimate = estimate_price(&records, query_year as f64, query_mileage as f64).unwrap();

        prop_assert!(estimate.is_finite());
        prop_assert!(estimate >= 0.0);
        prop_assert!(estimate <= max_price);
    }

    /// A fallback estimate is exactly the mean comparable price.
    #[test]
    fn prop_fallback_returns_mean_price(
        records in proptest::collection::vec(arb_record(), 1..30),
        query_year in 1950u32..2040,
        query_mileage in 0u32..400_000,
    ) {
        let estimate = PriceEstimator::default()
            .estimate(&records, query_year as f64, query_mileage as f64)
            .unwrap();

        if estimate.source == PriceSource::MeanFallback {
            let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            prop_assert_eq!(estimate.value, mean);
        } else {
            prop_assert_eq!(estimate.value, estimate.raw_prediction);
        }
    }

    /// Missing mileage values are imputed rather than failing the estimate.
    #[test]
    fn prop_sparse_mileage_still_estimates(
        mut records in proptest::collection::vec(arb_sparse_record(), 1..20),
        anchor in arb_record(),
    ) {
        // At least one present mileage keeps the column imputable.
        records.push(anchor);

        let estimate = estimate_price(&records, 2015.0, 60000.0);

        prop_assert!(estimate.is_ok());
        prop_assert!(estimate.unwrap().is_finite());
    }

    /// Estimation is a pure function of its inputs.
    #[test]
    fn prop_estimation_is_deterministic(
        records in proptest::collection::vec(arb_record(), 1..20),
        query_year in 1990u32..2030,
    ) {
        let a = estimate_price(&records, query_year as f64, 50000.0).unwrap();
        let b = estimate_price(&records, query_year as f64, 50000.0).unwrap();
        prop_assert_eq!(a.to_bits(), b.to_bits());
    }
}

// =============================================================================
// Fingerprint properties
// =============================================================================

proptest! {
    /// Equal queries always share a fingerprint.
    #[test]
    fn prop_fingerprint_is_deterministic(query in arb_query()) {
        let copy = EstimateQuery::new(
            query.make(),
            query.model(),
            query.mileage(),
            query.year(),
        ).unwrap();
        prop_assert_eq!(QueryFingerprint::compute(&query), QueryFingerprint::compute(&copy));
    }

    /// Queries that differ in any field get different fingerprints.
    #[test]
    fn prop_distinct_queries_get_distinct_fingerprints(a in arb_query(), b in arb_query()) {
        prop_assume!(a != b);
        prop_assert_ne!(QueryFingerprint::compute(&a), QueryFingerprint::compute(&b));
    }

    /// Parsing the textual form of a query yields the same fingerprint.
    #[test]
    fn prop_parsed_query_matches_numeric_query(query in arb_query()) {
        let parsed = EstimateQuery::parse(
            query.make(),
            query.model(),
            &query.mileage().to_string(),
            &query.year().to_string(),
        ).unwrap();
        prop_assert_eq!(QueryFingerprint::compute(&parsed), QueryFingerprint::compute(&query));
    }
}
