//! Curve fitters
//!
//! Every fitter predicts the 25 statistics of a [`MetricSet`] independently
//! and clamps the result to be non-negative.

use latcast_core::types::METRIC_COUNT;
use latcast_core::{Confidence, FitMethod, MetricSet, Observation};
use serde::{Deserialize, Serialize};

pub mod average;
pub mod basis;
pub mod linear;
pub mod polynomial;
pub mod solver;

pub use average::AverageFitter;
pub use basis::FeatureBasis;
pub use linear::{fit_plane, LinearFitter};
pub use polynomial::PolynomialFitter;
pub use solver::{DesignMatrix, GaussSeidel};

/// Input features used by the regression fitters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimensionality {
    /// Input and output tokens
    Two,
    /// Input tokens, output tokens and traffic level
    Three,
}

impl Dimensionality {
    /// Three features when the caller supplied a traffic level
    pub fn for_traffic(traffic_level: Option<f64>) -> Self {
        if traffic_level.is_some() {
            Dimensionality::Three
        } else {
            Dimensionality::Two
        }
    }
}

/// The point a prediction is evaluated at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub traffic_level: Option<f64>,
}

impl TargetPoint {
    pub fn new(input_tokens: f64, output_tokens: f64, traffic_level: Option<f64>) -> Self {
        Self {
            input_tokens,
            output_tokens,
            traffic_level,
        }
    }

    pub(crate) fn features(&self, default_traffic: f64) -> [f64; 3] {
        [
            self.input_tokens,
            self.output_tokens,
            self.traffic_level.unwrap_or(default_traffic),
        ]
    }
}

/// `[input, output, traffic]` for an observation
pub(crate) fn observation_features(observation: &Observation, default_traffic: f64) -> [f64; 3] {
    [
        observation.input_tokens,
        observation.output_tokens,
        observation.traffic_level.unwrap_or(default_traffic),
    ]
}

/// One statistic across every observation, in observation order
pub(crate) fn column(observations: &[Observation], index: usize) -> Vec<f64> {
    observations
        .iter()
        .map(|obs| obs.metrics.values()[index])
        .collect()
}

/// Apply `predict` to each statistic column and assemble a clamped [`MetricSet`]
pub(crate) fn predict_columns<F>(observations: &[Observation], mut predict: F) -> MetricSet
where
    F: FnMut(&[f64]) -> f64,
{
    let mut values = [0.0; METRIC_COUNT];
    for (index, value) in values.iter_mut().enumerate() {
        *value = predict(&column(observations, index));
    }
    MetricSet::from_values(values).clamp_non_negative()
}

/// Evaluate one surface per statistic at `point` and assemble a clamped [`MetricSet`]
pub(crate) fn evaluate_surfaces(surfaces: &[Surface], point: &[f64; 3]) -> MetricSet {
    let mut values = [0.0; METRIC_COUNT];
    for (value, surface) in values.iter_mut().zip(surfaces) {
        *value = surface.evaluate(point);
    }
    MetricSet::from_values(values).clamp_non_negative()
}

/// A fitted regression surface over `[input, output, traffic]`
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// `intercept + input_coef * x1 + output_coef * x2`
    Plane {
        intercept: f64,
        input_coef: f64,
        output_coef: f64,
    },
    /// Coefficients over an expanded feature basis
    Basis {
        basis: FeatureBasis,
        coefficients: Vec<f64>,
    },
}

impl Surface {
    pub fn evaluate(&self, point: &[f64; 3]) -> f64 {
        match self {
            Surface::Plane {
                intercept,
                input_coef,
                output_coef,
            } => intercept + input_coef * point[0] + output_coef * point[1],
            Surface::Basis {
                basis,
                coefficients,
            } => basis
                .expand(point)
                .iter()
                .zip(coefficients)
                .map(|(feature, coef)| feature * coef)
                .sum(),
        }
    }
}

/// A strategy that turns observations into predicted statistics
pub trait CurveFitter: Send + Sync {
    /// The concrete method this fitter implements
    fn method(&self) -> FitMethod;

    /// Predict every statistic at `target`; the result is clamped non-negative
    fn fit(&self, observations: &[Observation], target: &TargetPoint) -> MetricSet;

    /// A confidence label that replaces the distance-based score, if any
    fn confidence_override(&self, _observations_used: usize) -> Option<Confidence> {
        None
    }
}
