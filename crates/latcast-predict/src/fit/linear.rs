//! Multivariate linear regression

use super::{
    column, evaluate_surfaces, observation_features, CurveFitter, DesignMatrix, Dimensionality,
    FeatureBasis, GaussSeidel, Surface, TargetPoint,
};
use latcast_core::config::PredictorConfig;
use latcast_core::{FitMethod, MetricSet, Observation};

/// Closed-form fit of `y = a + b·x1 + c·x2` over the first two point features.
///
/// Solves the 2x2 covariance system. When its determinant is below
/// `singular_determinant` each feature is regressed on its own instead, with a
/// zero slope for a feature that does not vary.
///
/// The fallback adds both one-dimensional slopes. With collinear token
/// features (output a fixed multiple of input) each slope alone explains the
/// whole response, so the combined plane double-counts it and predictions
/// along the line are biased. The threshold is absolute, so a nearly
/// collinear design at large token scale can also pass it and get an
/// ill-conditioned closed-form solve. Like the fixed-sweep limit on
/// [`GaussSeidel`], this is left as is; outputs are only clamped.
pub fn fit_plane(points: &[[f64; 3]], ys: &[f64], singular_determinant: f64) -> Surface {
    let n = points.len() as f64;
    if points.is_empty() {
        return Surface::Plane {
            intercept: 0.0,
            input_coef: 0.0,
            output_coef: 0.0,
        };
    }

    let mean_x1 = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_x2 = points.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut var_x1, mut var_x2, mut cov_x1x2, mut cov_x1y, mut cov_x2y) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (p, y) in points.iter().zip(ys) {
        let d1 = p[0] - mean_x1;
        let d2 = p[1] - mean_x2;
        let dy = y - mean_y;
        var_x1 += d1 * d1;
        var_x2 += d2 * d2;
        cov_x1x2 += d1 * d2;
        cov_x1y += d1 * dy;
        cov_x2y += d2 * dy;
    }
    var_x1 /= n;
    var_x2 /= n;
    cov_x1x2 /= n;
    cov_x1y /= n;
    cov_x2y /= n;

    let det = var_x1 * var_x2 - cov_x1x2 * cov_x1x2;
    let (input_coef, output_coef) = if det.abs() > singular_determinant {
        (
            (cov_x1y * var_x2 - cov_x2y * cov_x1x2) / det,
            (cov_x2y * var_x1 - cov_x1y * cov_x1x2) / det,
        )
    } else {
        let slope = |cov: f64, var: f64| if var > 0.0 { cov / var } else { 0.0 };
        (slope(cov_x1y, var_x1), slope(cov_x2y, var_x2))
    };

    Surface::Plane {
        intercept: mean_y - input_coef * mean_x1 - output_coef * mean_x2,
        input_coef,
        output_coef,
    }
}

/// Linear regression in two or three features
#[derive(Debug, Clone)]
pub struct LinearFitter {
    dims: Dimensionality,
    solver: GaussSeidel,
    singular_determinant: f64,
    default_traffic: f64,
}

impl LinearFitter {
    pub fn new(dims: Dimensionality, config: &PredictorConfig) -> Self {
        Self {
            dims,
            solver: GaussSeidel::from_config(&config.solver),
            singular_determinant: config.solver.singular_determinant,
            default_traffic: config.default_traffic_level,
        }
    }

    fn points(&self, observations: &[Observation]) -> Vec<[f64; 3]> {
        observations
            .iter()
            .map(|obs| observation_features(obs, self.default_traffic))
            .collect()
    }

    /// Fit a single response column
    pub fn fit_surface(&self, observations: &[Observation], ys: &[f64]) -> Surface {
        let points = self.points(observations);
        match self.dims {
            Dimensionality::Two => fit_plane(&points, ys, self.singular_determinant),
            Dimensionality::Three => {
                DesignMatrix::new(FeatureBasis::Linear3, &points).fit(ys, &self.solver)
            }
        }
    }

    /// Fit one surface per statistic, in [`MetricSet::values`] order
    pub fn fit_all(&self, observations: &[Observation]) -> Vec<Surface> {
        let points = self.points(observations);
        let design = match self.dims {
            Dimensionality::Two => None,
            Dimensionality::Three => Some(DesignMatrix::new(FeatureBasis::Linear3, &points)),
        };

        (0..latcast_core::types::METRIC_COUNT)
            .map(|index| {
                let ys = column(observations, index);
                match &design {
                    Some(design) => design.fit(&ys, &self.solver),
                    None => fit_plane(&points, &ys, self.singular_determinant),
                }
            })
            .collect()
    }
}

impl CurveFitter for LinearFitter {
    fn method(&self) -> FitMethod {
        FitMethod::Linear
    }

    fn fit(&self, observations: &[Observation], target: &TargetPoint) -> MetricSet {
        let point = target.features(self.default_traffic);
        evaluate_surfaces(&self.fit_all(observations), &point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::grid;

    const PLANE_POINTS: [(f64, f64); 5] = [
        (100.0, 50.0),
        (200.0, 50.0),
        (100.0, 150.0),
        (300.0, 250.0),
        (250.0, 80.0),
    ];

    fn plane(input: f64, output: f64) -> f64 {
        5.0 + 2.0 * input + 3.0 * output
    }

    #[test]
    fn test_recovers_exact_plane() {
        let points: Vec<[f64; 3]> = PLANE_POINTS.iter().map(|&(x1, x2)| [x1, x2, 0.0]).collect();
        let ys: Vec<f64> = PLANE_POINTS.iter().map(|&(x1, x2)| plane(x1, x2)).collect();

        match fit_plane(&points, &ys, 1e-10) {
            Surface::Plane {
                intercept,
                input_coef,
                output_coef,
            } => {
                assert!((intercept - 5.0).abs() < 1e-6);
                assert!((input_coef - 2.0).abs() < 1e-6);
                assert!((output_coef - 3.0).abs() < 1e-6);
            }
            other => panic!("expected a plane, got {:?}", other),
        }
    }

    #[test]
    fn test_predicts_on_plane() {
        let observations = grid(&PLANE_POINTS, plane);
        let fitter = LinearFitter::new(Dimensionality::Two, &PredictorConfig::default());

        let target = TargetPoint::new(512.0, 1024.0, None);
        let predicted = fitter.fit(&observations, &target);
        let expected = plane(512.0, 1024.0);
        for (name, value) in predicted.named_values() {
            assert!((value - expected).abs() < 1e-6, "{} = {}", name, value);
        }
    }

    #[test]
    fn test_singular_system_falls_back_per_feature() {
        // output never varies: slope on input only, output slope is zero
        let observations = grid(&[(100.0, 64.0), (200.0, 64.0), (400.0, 64.0)], |x1, _| {
            10.0 + 0.5 * x1
        });
        let fitter = LinearFitter::new(Dimensionality::Two, &PredictorConfig::default());
        let ys = column(&observations, MetricSet::TTFT_MEAN);

        match fitter.fit_surface(&observations, &ys) {
            Surface::Plane {
                intercept,
                input_coef,
                output_coef,
            } => {
                assert!((input_coef - 0.5).abs() < 1e-9);
                assert_eq!(output_coef, 0.0);
                assert!((intercept - 10.0).abs() < 1e-6);
            }
            other => panic!("expected a plane, got {:?}", other),
        }
    }

    #[test]
    fn test_collinear_features_do_not_fail() {
        let observations = grid(&[(100.0, 100.0), (200.0, 200.0), (300.0, 300.0)], |x1, _| x1);
        let fitter = LinearFitter::new(Dimensionality::Two, &PredictorConfig::default());

        let predicted = fitter.fit(&observations, &TargetPoint::new(150.0, 150.0, None));
        assert!(predicted.ttft.mean.is_finite());
        assert!(predicted.ttft.mean >= 0.0);
    }

    #[test]
    fn test_collinear_fallback_sums_independent_slopes() {
        // output = 2 * input, response = input
        let points = [[100.0, 200.0, 0.0], [200.0, 400.0, 0.0], [300.0, 600.0, 0.0]];
        let ys = [100.0, 200.0, 300.0];

        let surface = fit_plane(&points, &ys, 1e-10);
        match &surface {
            Surface::Plane {
                input_coef,
                output_coef,
                ..
            } => {
                assert!((input_coef - 1.0).abs() < 1e-9);
                assert!((output_coef - 0.5).abs() < 1e-9);
            }
            other => panic!("expected a plane, got {:?}", other),
        }
        // on the data line the true value is 250
        assert!((surface.evaluate(&[250.0, 500.0, 0.0]) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_extrapolation_is_clamped() {
        let observations = grid(&[(100.0, 50.0), (200.0, 50.0), (100.0, 150.0)], |x1, _| {
            1000.0 - 4.0 * x1
        });
        let fitter = LinearFitter::new(Dimensionality::Two, &PredictorConfig::default());

        let predicted = fitter.fit(&observations, &TargetPoint::new(4000.0, 50.0, None));
        assert_eq!(predicted.ttft.mean, 0.0);
        assert_eq!(predicted.throughput, 0.0);
    }

    #[test]
    fn test_three_feature_variant_uses_traffic() {
        let mut observations = Vec::new();
        for &(x1, x2) in &[(1.0, 1.0), (2.0, 1.0), (1.0, 2.0), (2.0, 2.0)] {
            for traffic in [0.0, 1.0] {
                let value = 3.0 + x1 + 2.0 * x2 + 4.0 * traffic;
                let obs = Observation::new(x1, x2, MetricSet::from_values([value; 25]))
                    .with_traffic(traffic);
                observations.push(obs);
            }
        }
        let fitter = LinearFitter::new(Dimensionality::Three, &PredictorConfig::default());

        let low = fitter.fit(&observations, &TargetPoint::new(1.5, 1.5, Some(0.0)));
        let high = fitter.fit(&observations, &TargetPoint::new(1.5, 1.5, Some(1.0)));
        assert!((high.e2e.mean - low.e2e.mean - 4.0).abs() < 1e-3);
    }
}
