use crate::errors::Result;
use crate::valuation::valuation_model::{EstimateOutcome, ValuationConfig};
use crate::vehicles::EstimateQuery;
use async_trait::async_trait;

/// Trait for the valuation pipeline
#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Returns a cached or freshly computed estimate, or `InsufficientData`.
    async fn get_estimate(&self, query: &EstimateQuery) -> Result<EstimateOutcome>;

    fn config(&self) -> &ValuationConfig;
}
