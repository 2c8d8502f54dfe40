/// Default minimum number of comparable listings required to estimate
pub const DEFAULT_MIN_RECORDS_REQUIRED: usize = 5;

/// Maximum number of comparable listings returned alongside an estimate
pub const MAX_RETURNED_COMPARABLES: usize = 100;

/// Degree of the polynomial feature expansion over (year, mileage)
pub const POLYNOMIAL_DEGREE: usize = 2;

/// Version tag of the fingerprint canonical form and cached payload shape
pub const FINGERPRINT_VERSION: &str = "carvalue:v1";

/// Singular values at or below this fraction of the largest are treated as zero
pub const SINGULAR_VALUE_CUTOFF: f64 = f64::EPSILON;
