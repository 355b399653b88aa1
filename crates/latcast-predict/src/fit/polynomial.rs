//! Quadratic regression with interaction terms

use super::{
    column, evaluate_surfaces, observation_features, CurveFitter, DesignMatrix, Dimensionality,
    FeatureBasis, GaussSeidel, Surface, TargetPoint,
};
use latcast_core::config::PredictorConfig;
use latcast_core::{Confidence, FitMethod, MetricSet, Observation};

/// Fewest observations a quadratic surface is trusted with
pub const MIN_POLYNOMIAL_OBSERVATIONS: usize = 3;

/// Second-order polynomial regression in two or three features
#[derive(Debug, Clone)]
pub struct PolynomialFitter {
    basis: FeatureBasis,
    solver: GaussSeidel,
    default_traffic: f64,
}

impl PolynomialFitter {
    pub fn new(dims: Dimensionality, config: &PredictorConfig) -> Self {
        let basis = match dims {
            Dimensionality::Two => FeatureBasis::Quadratic2,
            Dimensionality::Three => FeatureBasis::Quadratic3,
        };
        Self {
            basis,
            solver: GaussSeidel::from_config(&config.solver),
            default_traffic: config.default_traffic_level,
        }
    }

    fn design(&self, observations: &[Observation]) -> DesignMatrix {
        let points: Vec<[f64; 3]> = observations
            .iter()
            .map(|obs| observation_features(obs, self.default_traffic))
            .collect();
        DesignMatrix::new(self.basis, &points)
    }

    /// Fit a single response column
    pub fn fit_surface(&self, observations: &[Observation], ys: &[f64]) -> Surface {
        self.design(observations).fit(ys, &self.solver)
    }

    /// Fit one surface per statistic, in [`MetricSet::values`] order
    pub fn fit_all(&self, observations: &[Observation]) -> Vec<Surface> {
        let design = self.design(observations);
        (0..latcast_core::types::METRIC_COUNT)
            .map(|index| design.fit(&column(observations, index), &self.solver))
            .collect()
    }
}

impl CurveFitter for PolynomialFitter {
    fn method(&self) -> FitMethod {
        FitMethod::Polynomial
    }

    fn fit(&self, observations: &[Observation], target: &TargetPoint) -> MetricSet {
        let point = target.features(self.default_traffic);
        evaluate_surfaces(&self.fit_all(observations), &point)
    }

    fn confidence_override(&self, observations_used: usize) -> Option<Confidence> {
        // The selector already downgrades sparse polynomial requests; kept as a second guard.
        if observations_used < MIN_POLYNOMIAL_OBSERVATIONS {
            Some(Confidence::Low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::grid;

    fn unit_grid() -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        for x1 in [0.0, 0.5, 1.0, 1.5, 2.0] {
            for x2 in [0.0, 0.5, 1.0, 1.5, 2.0] {
                points.push((x1, x2));
            }
        }
        points
    }

    #[test]
    fn test_fits_small_scale_quadratic() {
        let surface = |x1: f64, x2: f64| 2.0 + x1 + 0.5 * x2 + 0.25 * x1 * x1 + x1 * x2;
        let observations = grid(&unit_grid(), surface);
        let fitter = PolynomialFitter::new(Dimensionality::Two, &PredictorConfig::default());

        let predicted = fitter.fit(&observations, &TargetPoint::new(1.25, 0.75, None));
        assert!((predicted.ttft.mean - surface(1.25, 0.75)).abs() < 0.05);
    }

    #[test]
    fn test_predictions_are_non_negative() {
        let observations = grid(&[(128.0, 64.0), (512.0, 64.0), (128.0, 512.0), (1024.0, 1024.0)], |x1, x2| {
            (x1 - x2).abs()
        });
        let fitter = PolynomialFitter::new(Dimensionality::Two, &PredictorConfig::default());

        for target in [(1.0, 1.0), (4096.0, 16.0), (16.0, 4096.0)] {
            let predicted = fitter.fit(&observations, &TargetPoint::new(target.0, target.1, None));
            assert!(predicted.values().iter().all(|v| *v >= 0.0 && v.is_finite()));
        }
    }

    #[test]
    fn test_three_feature_variant_has_ten_terms() {
        let observations: Vec<Observation> = grid(&unit_grid(), |x1, x2| x1 + x2)
            .into_iter()
            .enumerate()
            .map(|(i, obs)| obs.with_traffic((i % 3) as f64 * 0.5))
            .collect();
        let fitter = PolynomialFitter::new(Dimensionality::Three, &PredictorConfig::default());

        match fitter.fit_surface(&observations, &column(&observations, 0)) {
            Surface::Basis { basis, coefficients } => {
                assert_eq!(basis, FeatureBasis::Quadratic3);
                assert_eq!(coefficients.len(), 10);
            }
            other => panic!("expected a basis surface, got {:?}", other),
        }
    }

    #[test]
    fn test_sparse_fit_is_low_confidence() {
        let fitter = PolynomialFitter::new(Dimensionality::Two, &PredictorConfig::default());
        assert_eq!(fitter.confidence_override(2), Some(Confidence::Low));
        assert_eq!(fitter.confidence_override(3), None);
    }
}
