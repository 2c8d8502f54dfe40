use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{QueryFingerprint, ResultCache};
use crate::errors::{Error, Result};
use crate::vehicles::{EstimateQuery, ListingRepositoryTrait, VehicleRecord};

use super::estimator::PriceEstimator;
use super::valuation_errors::ValuationError;
use super::valuation_model::{EstimateOutcome, EstimationResult, ValuationConfig};
use super::valuation_traits::ValuationServiceTrait;

/// Sequences cache lookup, retrieval, threshold check, estimation and cache store.
pub struct ValuationService {
    listing_repository: Arc<dyn ListingRepositoryTrait>,
    cache: ResultCache,
    estimator: PriceEstimator,
    config: ValuationConfig,
}

impl ValuationService {
    pub fn new(
        listing_repository: Arc<dyn ListingRepositoryTrait>,
        cache: ResultCache,
        config: ValuationConfig,
    ) -> Self {
        ValuationService {
            listing_repository,
            cache,
            estimator: PriceEstimator::default(),
            config,
        }
    }

    /// Replaces the estimation engine, e.g. to change the polynomial degree.
    pub fn with_estimator(mut self, estimator: PriceEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    fn fetch_comparables(&self, query: &EstimateQuery) -> Result<Vec<VehicleRecord>> {
        let rows = self
            .listing_repository
            .find_comparables(
                query.make(),
                query.model(),
                self.config.comparable_filter(),
            )
            .map_err(|e| {
                log::error!(
                    "Failed to fetch comparables for {} {}: {}",
                    query.make(),
                    query.model(),
                    e
                );
                Error::Valuation(ValuationError::StoreUnavailable(e.to_string()))
            })?;
        Ok(rows.into_iter().map(VehicleRecord::from).collect())
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn get_estimate(&self, query: &EstimateQuery) -> Result<EstimateOutcome> {
        let fingerprint = QueryFingerprint::compute(query);

        if let Some(cached) = self.cache.get(&fingerprint).await {
            log::debug!("Estimate for {} served from cache", fingerprint);
            return Ok(EstimateOutcome::Estimated(cached));
        }
        log::debug!("Cache miss for {}", fingerprint);

        let records = self.fetch_comparables(query)?;

        let required = self.config.min_records_required();
        if records.len() < required {
            log::info!(
                "Cannot estimate {} {}: {} comparables found, {} required",
                query.make(),
                query.model(),
                records.len(),
                required
            );
            return Ok(EstimateOutcome::InsufficientData {
                found: records.len(),
                required,
            });
        }

        // The fit sees every retrieved record; only the returned list is capped.
        let comparables: Vec<VehicleRecord> = records
            .iter()
            .take(self.config.max_returned_comparables())
            .cloned()
            .collect();

        let estimate = self
            .estimator
            .estimate(&records, query.year(), query.mileage())?;

        let result = EstimationResult {
            estimate: estimate.value,
            comparables,
        };

        self.cache.put(&fingerprint, &result).await;

        Ok(EstimateOutcome::Estimated(result))
    }

    fn config(&self) -> &ValuationConfig {
        &self.config
    }
}
