//! Simple averaging

use super::{predict_columns, CurveFitter, TargetPoint};
use latcast_core::{Confidence, FitMethod, MetricSet, Observation};

/// Predicts the arithmetic mean of each statistic, ignoring the target point
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageFitter;

impl AverageFitter {
    pub fn new() -> Self {
        Self
    }
}

impl CurveFitter for AverageFitter {
    fn method(&self) -> FitMethod {
        FitMethod::Average
    }

    fn fit(&self, observations: &[Observation], _target: &TargetPoint) -> MetricSet {
        if observations.is_empty() {
            return MetricSet::default();
        }
        let n = observations.len() as f64;
        predict_columns(observations, |ys| ys.iter().sum::<f64>() / n)
    }

    fn confidence_override(&self, _observations_used: usize) -> Option<Confidence> {
        Some(Confidence::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::grid;

    #[test]
    fn test_average_of_two_observations() {
        let mut low = MetricSet::default();
        low.ttft.mean = 100.0;
        let mut high = MetricSet::default();
        high.ttft.mean = 200.0;
        let observations = vec![
            Observation::new(128.0, 64.0, low),
            Observation::new(512.0, 256.0, high),
        ];

        for target in [
            TargetPoint::new(1.0, 1.0, None),
            TargetPoint::new(100_000.0, 8.0, Some(2.0)),
        ] {
            let predicted = AverageFitter::new().fit(&observations, &target);
            assert_eq!(predicted.ttft.mean, 150.0);
            assert_eq!(predicted.e2e.mean, 0.0);
        }
    }

    #[test]
    fn test_every_statistic_is_averaged() {
        let observations = grid(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)], |x1, _| x1 * 10.0);
        let predicted = AverageFitter::new().fit(&observations, &TargetPoint::new(9.0, 9.0, None));
        assert!(predicted.values().iter().all(|&v| (v - 20.0).abs() < 1e-12));
    }

    #[test]
    fn test_always_low_confidence() {
        assert_eq!(AverageFitter::new().confidence_override(1), Some(Confidence::Low));
        assert_eq!(AverageFitter::new().confidence_override(50), Some(Confidence::Low));
    }
}
