//! Linear-versus-polynomial detection for auto-detect mode

use crate::fit::{column, observation_features, Dimensionality, LinearFitter, PolynomialFitter, Surface};
use latcast_core::config::PredictorConfig;
use latcast_core::{FitMethod, MetricSet, Observation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Goodness of fit for both candidate models on the representative statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearityReport {
    pub r2_linear: f64,
    pub r2_polynomial: f64,
    /// `Linear` or `Polynomial`
    pub method: FitMethod,
}

/// Coefficient of determination `1 - SS_res / SS_tot`, clamped to `[0, 1]`.
///
/// A constant response has no variance to explain; it scores 1 when the
/// predictions reproduce it and 0 otherwise.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if !ss_res.is_finite() {
        return 0.0;
    }
    if ss_tot <= f64::EPSILON {
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Decides whether a plane explains the data well enough to skip the quadratic surface
#[derive(Debug, Clone)]
pub struct LinearityDetector {
    config: PredictorConfig,
}

impl LinearityDetector {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Compare linear and polynomial fits of mean TTFT
    pub fn detect(&self, observations: &[Observation], dims: Dimensionality) -> LinearityReport {
        let ys = column(observations, MetricSet::TTFT_MEAN);
        let points: Vec<[f64; 3]> = observations
            .iter()
            .map(|obs| observation_features(obs, self.config.default_traffic_level))
            .collect();

        let linear = LinearFitter::new(dims, &self.config).fit_surface(observations, &ys);
        let polynomial = PolynomialFitter::new(dims, &self.config).fit_surface(observations, &ys);

        let r2_linear = r_squared(&ys, &evaluate_at(&linear, &points));
        let r2_polynomial = r_squared(&ys, &evaluate_at(&polynomial, &points));

        let thresholds = &self.config.linearity;
        let method = if (r2_polynomial - r2_linear) < thresholds.min_r2_gain
            || r2_linear > thresholds.linear_r2
        {
            FitMethod::Linear
        } else {
            FitMethod::Polynomial
        };

        debug!(
            "Linearity check: R² linear {:.4}, polynomial {:.4} -> {}",
            r2_linear, r2_polynomial, method
        );

        LinearityReport {
            r2_linear,
            r2_polynomial,
            method,
        }
    }
}

fn evaluate_at(surface: &Surface, points: &[[f64; 3]]) -> Vec<f64> {
    points.iter().map(|p| surface.evaluate(p)).collect()
}
