//! Polynomial least-squares regression of price on (year, mileage).
//!
//! ## Design notes
//!
//! * **Feature space**: raw inputs are expanded into every monomial `a^i * b^j`
//!   with `i + j <= degree`, ordered by total degree and then by descending
//!   power of the first input. For degree 2 this is `[1, a, b, a², ab, b²]`.
//! * **Intercept**: the bias term is not solved for. Every other feature
//!   column and the target are centered on their training means, the slopes
//!   are solved on the centered columns, and the intercept is recovered as
//!   `ȳ - x̄·β`.
//! * **Solver**: ordinary least squares solved as a minimum-norm problem via a
//!   one-sided Jacobi SVD of the centered design. Rank-deficient and
//!   under-determined systems (fewer rows than features) still produce the
//!   unique minimum-norm slopes, which interpolate the training points. The
//!   minimum-norm choice depends on the basis, so the expansion is never
//!   rescaled.
//!
//! ## Invariants
//!
//! * `slopes.len() == features.len() - 1`.
//! * Diagnostics (RMSE, MAE) are non-negative.

use crate::constants::SINGULAR_VALUE_CUTOFF;
use crate::valuation::ValuationError;

const MAX_JACOBI_SWEEPS: usize = 60;
const ORTHOGONALITY_TOL: f64 = 1e-15;

// ============================================================================
// Feature Expansion
// ============================================================================

/// Polynomial feature expansion of two inputs, bias term included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolynomialFeatures {
    degree: usize,
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of output features: `(d + 1)(d + 2) / 2`.
    pub fn len(&self) -> usize {
        (self.degree + 1) * (self.degree + 2) / 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn transform(&self, a: f64, b: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.len());
        for total in 0..=self.degree {
            for power_b in 0..=total {
                let power_a = total - power_b;
                row.push(a.powi(power_a as i32) * b.powi(power_b as i32));
            }
        }
        row
    }
}

// ============================================================================
// Regression Model
// ============================================================================

/// A fitted polynomial regression of price on (year, mileage).
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialRegression {
    features: PolynomialFeatures,
    intercept: f64,
    slopes: Vec<f64>,
    rank: usize,
}

impl PolynomialRegression {
    /// Fits price on the polynomial expansion of (year, mileage) in-sample.
    pub fn fit(
        years: &[f64],
        mileages: &[f64],
        prices: &[f64],
        features: PolynomialFeatures,
    ) -> Result<Self, ValuationError> {
        debug_assert_eq!(years.len(), prices.len());
        debug_assert_eq!(mileages.len(), prices.len());

        if prices.is_empty() {
            return Err(ValuationError::EmptyTrainingSet);
        }
        let n = prices.len() as f64;

        // Column-major design matrix without the bias column.
        let mut columns = vec![Vec::with_capacity(prices.len()); features.len() - 1];
        for (&year, &mileage) in years.iter().zip(mileages) {
            let row = features.transform(year, mileage);
            for (column, value) in columns.iter_mut().zip(row.into_iter().skip(1)) {
                column.push(value);
            }
        }

        let column_means: Vec<f64> = columns
            .iter()
            .map(|column| column.iter().sum::<f64>() / n)
            .collect();
        for (column, mean) in columns.iter_mut().zip(&column_means) {
            column.iter_mut().for_each(|value| *value -= mean);
        }
        let price_mean = prices.iter().sum::<f64>() / n;
        let centered_prices: Vec<f64> = prices.iter().map(|p| p - price_mean).collect();

        let (slopes, slope_rank) = solve_min_norm_least_squares(columns, &centered_prices);
        let intercept = price_mean
            - column_means
                .iter()
                .zip(&slopes)
                .map(|(mean, beta)| mean * beta)
                .sum::<f64>();
        let rank = slope_rank + 1;

        if rank < features.len() {
            log::debug!(
                "Regression design is rank deficient ({} of {} features, {} rows); using minimum-norm solution",
                rank,
                features.len(),
                prices.len()
            );
        }

        Ok(Self {
            features,
            intercept,
            slopes,
            rank,
        })
    }

    pub fn predict(&self, year: f64, mileage: f64) -> f64 {
        let row = self.features.transform(year, mileage);
        self.intercept
            + row
                .iter()
                .skip(1)
                .zip(&self.slopes)
                .map(|(x, beta)| x * beta)
                .sum::<f64>()
    }

    pub fn predict_many(&self, years: &[f64], mileages: &[f64]) -> Vec<f64> {
        years
            .iter()
            .zip(mileages)
            .map(|(&year, &mileage)| self.predict(year, mileage))
            .collect()
    }

    pub fn features(&self) -> PolynomialFeatures {
        self.features
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients of the non-bias features, in expansion order.
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// Numerical rank of the design matrix, intercept included.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// Minimum-norm solution of `min ||X b - y||` via one-sided Jacobi SVD.
///
/// `columns` holds the design matrix column by column. Returns the
/// coefficients and the numerical rank.
fn solve_min_norm_least_squares(mut columns: Vec<Vec<f64>>, targets: &[f64]) -> (Vec<f64>, usize) {
    let p = columns.len();
    let mut v = vec![vec![0.0; p]; p];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut rotated = false;
        for i in 0..p {
            for j in (i + 1)..p {
                let alpha = dot(&columns[i], &columns[i]);
                let beta = dot(&columns[j], &columns[j]);
                let gamma = dot(&columns[i], &columns[j]);
                if gamma == 0.0 || gamma.abs() <= ORTHOGONALITY_TOL * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                let (left, right) = columns.split_at_mut(j);
                rotate(&mut left[i], &mut right[0], c, s);
                for row in v.iter_mut() {
                    let (vi, vj) = (row[i], row[j]);
                    row[i] = c * vi - s * vj;
                    row[j] = s * vi + c * vj;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    // After convergence column k equals sigma_k * u_k.
    let sigmas: Vec<f64> = columns.iter().map(|c| dot(c, c).sqrt()).collect();
    let sigma_max = sigmas.iter().copied().fold(0.0, f64::max);
    let cutoff = sigma_max * SINGULAR_VALUE_CUTOFF;

    let mut coefficients = vec![0.0; p];
    let mut rank = 0;
    for (k, &sigma) in sigmas.iter().enumerate() {
        if sigma <= cutoff || sigma == 0.0 {
            continue;
        }
        rank += 1;
        let weight = dot(&columns[k], targets) / (sigma * sigma);
        for (coefficient, row) in coefficients.iter_mut().zip(&v) {
            *coefficient += weight * row[k];
        }
    }
    (coefficients, rank)
}

fn rotate(ci: &mut [f64], cj: &mut [f64], c: f64, s: f64) {
    for (a, b) in ci.iter_mut().zip(cj.iter_mut()) {
        let (x, y) = (*a, *b);
        *a = c * x - s * y;
        *b = s * x + c * y;
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Diagnostics
// ============================================================================

/// In-sample goodness-of-fit metrics. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDiagnostics {
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error ("average off by").
    pub mae: f64,
    pub samples: usize,
    pub rank: usize,
}

impl FitDiagnostics {
    pub fn compute(actual: &[f64], fitted: &[f64], rank: usize) -> Self {
        let samples = actual.len();
        if samples == 0 {
            return Self {
                rmse: 0.0,
                mae: 0.0,
                samples,
                rank,
            };
        }
        let (sum_sq, sum_abs) = actual
            .iter()
            .zip(fitted)
            .fold((0.0, 0.0), |(sq, abs), (y, y_hat)| {
                let r = y - y_hat;
                (sq + r * r, abs + r.abs())
            });
        let n = samples as f64;
        Self {
            rmse: (sum_sq / n).sqrt(),
            mae: sum_abs / n,
            samples,
            rank,
        }
    }
}
