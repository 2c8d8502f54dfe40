//! Query fingerprint computation for result caching.
//!
//! Runtime hashers are not stable across processes or builds. The fingerprint
//! is a SHA-256 digest of a canonical, versioned rendering of the query so
//! every worker derives the same cache key for the same query.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::FINGERPRINT_VERSION;
use crate::vehicles::EstimateQuery;

/// Deterministic cache key for an estimation query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFingerprint(String);

impl QueryFingerprint {
    /// Computes the fingerprint of `(make, model, mileage, year)`.
    ///
    /// The canonical form is `carvalue:v1|` followed by each field as
    /// `<byte length>:<value>|`, so no field value can bleed into the next.
    pub fn compute(query: &EstimateQuery) -> Self {
        Self::from_canonical(&canonical_form(query))
    }

    fn from_canonical(canonical: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_form(query: &EstimateQuery) -> String {
    let mut canonical = String::from(FINGERPRINT_VERSION);
    canonical.push('|');
    for field in [
        query.make().to_string(),
        query.model().to_string(),
        normalize_number(query.mileage()),
        normalize_number(query.year()),
    ] {
        canonical.push_str(&format!("{}:{}|", field.len(), field));
    }
    canonical
}

/// Shortest round-trip rendering, with `-0` folded into `0`.
fn normalize_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
