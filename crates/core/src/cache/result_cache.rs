use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cache_traits::CacheBackend;
use super::fingerprint::QueryFingerprint;
use crate::constants::FINGERPRINT_VERSION;
use crate::valuation::EstimationResult;

/// Stored envelope; entries written under another version read as misses.
#[derive(Serialize, Deserialize)]
struct CachedEstimate {
    version: String,
    result: EstimationResult,
}

/// Best-effort cache of estimation results keyed by query fingerprint.
///
/// Backend failures are logged and swallowed: a failed read is a miss and a
/// failed write is dropped. Neither fails the estimation.
#[derive(Clone)]
pub struct ResultCache {
    backend: Arc<dyn CacheBackend>,
}

impl ResultCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub async fn get(&self, fingerprint: &QueryFingerprint) -> Option<EstimationResult> {
        let payload = match self.backend.get(fingerprint.as_str()).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                log::warn!(
                    "Cache read failed for {}, treating as miss: {}",
                    fingerprint,
                    e
                );
                return None;
            }
        };

        match serde_json::from_slice::<CachedEstimate>(&payload) {
            Ok(entry) if entry.version == FINGERPRINT_VERSION => Some(entry.result),
            Ok(entry) => {
                log::debug!(
                    "Ignoring cache entry {} written under version {}",
                    fingerprint,
                    entry.version
                );
                None
            }
            Err(e) => {
                log::warn!("Undecodable cache entry {}: {}", fingerprint, e);
                None
            }
        }
    }

    pub async fn put(&self, fingerprint: &QueryFingerprint, result: &EstimationResult) {
        let entry = CachedEstimate {
            version: FINGERPRINT_VERSION.to_string(),
            result: result.clone(),
        };
        let payload = match serde_json::to_vec(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Failed to serialize cache entry {}: {}", fingerprint, e);
                return;
            }
        };
        if let Err(e) = self.backend.set(fingerprint.as_str(), payload).await {
            log::warn!("Cache write failed for {}: {}", fingerprint, e);
        }
    }
}
