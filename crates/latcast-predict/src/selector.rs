//! Fit-method selection with graceful downgrades for sparse data

use crate::fit::polynomial::MIN_POLYNOMIAL_OBSERVATIONS;
use crate::fit::Dimensionality;
use crate::linearity::LinearityDetector;
use latcast_core::config::PredictorConfig;
use latcast_core::{FitMethod, Observation, ResolvedMethod};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Resolves a requested method into the one the data can support
#[derive(Debug, Clone)]
pub struct MethodSelector {
    detector: LinearityDetector,
}

impl MethodSelector {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            detector: LinearityDetector::new(config),
        }
    }

    /// Apply the downgrade rules, then consult the linearity detector for auto-detect.
    ///
    /// 1. One observation, or no variation in either token dimension: average.
    /// 2. Fewer than three observations: polynomial becomes linear.
    /// 3. Auto-detect picks linear or polynomial from goodness of fit.
    /// 4. Anything else is used as requested.
    pub fn select(
        &self,
        observations: &[Observation],
        requested: FitMethod,
        dims: Dimensionality,
    ) -> ResolvedMethod {
        let auto = requested == FitMethod::AutoDetect;
        let resolve = |method| {
            if auto {
                ResolvedMethod::auto(method)
            } else {
                ResolvedMethod::explicit(method)
            }
        };

        let count = observations.len();
        let distinct_inputs = distinct_rounded(observations.iter().map(|o| o.input_tokens));
        let distinct_outputs = distinct_rounded(observations.iter().map(|o| o.output_tokens));

        if count <= 1 || (distinct_inputs < 2 && distinct_outputs < 2) {
            if requested != FitMethod::Average && !auto {
                warn!(
                    "Requested {} but {} observation(s) with {} input / {} output lengths only support averaging",
                    requested, count, distinct_inputs, distinct_outputs
                );
            }
            return resolve(FitMethod::Average);
        }

        if count < MIN_POLYNOMIAL_OBSERVATIONS {
            if requested == FitMethod::Polynomial {
                warn!(
                    "Polynomial fit needs {} observations, have {}; using linear",
                    MIN_POLYNOMIAL_OBSERVATIONS, count
                );
            }
            if requested == FitMethod::Polynomial || auto {
                return resolve(FitMethod::Linear);
            }
        }

        if auto {
            let report = self.detector.detect(observations, dims);
            debug!("Auto-detect chose {} from {} observations", report.method, count);
            return ResolvedMethod::auto(report.method);
        }

        ResolvedMethod::explicit(requested)
    }
}

/// Number of distinct values after rounding to whole tokens
fn distinct_rounded(values: impl Iterator<Item = f64>) -> usize {
    values
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::grid;

    fn selector() -> MethodSelector {
        MethodSelector::new(PredictorConfig::default())
    }

    const ALL_METHODS: [FitMethod; 4] = [
        FitMethod::AutoDetect,
        FitMethod::Polynomial,
        FitMethod::Linear,
        FitMethod::Average,
    ];

    #[test]
    fn test_single_observation_forces_average() {
        let observations = grid(&[(512.0, 128.0)], |_, _| 10.0);
        for method in ALL_METHODS {
            let resolved = selector().select(&observations, method, Dimensionality::Two);
            assert_eq!(resolved.method, FitMethod::Average);
        }
        let resolved = selector().select(&observations, FitMethod::AutoDetect, Dimensionality::Two);
        assert_eq!(resolved.to_string(), "auto_simple_average");
        let resolved = selector().select(&observations, FitMethod::Linear, Dimensionality::Two);
        assert_eq!(resolved.to_string(), "average");
    }

    #[test]
    fn test_no_token_variation_forces_average() {
        // jitter from averaging rounds to the same token counts
        let observations = grid(
            &[(512.0, 128.0), (512.2, 127.9), (511.8, 128.3), (512.0, 128.0)],
            |_, _| 10.0,
        );
        for method in ALL_METHODS {
            let resolved = selector().select(&observations, method, Dimensionality::Three);
            assert_eq!(resolved.method, FitMethod::Average);
        }
    }

    #[test]
    fn test_two_observations_downgrade_polynomial() {
        let observations = grid(&[(128.0, 64.0), (512.0, 64.0)], |x1, _| x1);
        let resolved = selector().select(&observations, FitMethod::Polynomial, Dimensionality::Two);
        assert_eq!(resolved, ResolvedMethod::explicit(FitMethod::Linear));

        let resolved = selector().select(&observations, FitMethod::AutoDetect, Dimensionality::Two);
        assert_eq!(resolved, ResolvedMethod::auto(FitMethod::Linear));

        let resolved = selector().select(&observations, FitMethod::Average, Dimensionality::Two);
        assert_eq!(resolved, ResolvedMethod::explicit(FitMethod::Average));
    }

    #[test]
    fn test_explicit_methods_pass_through() {
        let observations = grid(&[(128.0, 64.0), (512.0, 64.0), (128.0, 256.0)], |x1, x2| x1 + x2);
        for method in [FitMethod::Polynomial, FitMethod::Linear, FitMethod::Average] {
            let resolved = selector().select(&observations, method, Dimensionality::Two);
            assert_eq!(resolved, ResolvedMethod::explicit(method));
        }
    }

    #[test]
    fn test_auto_detect_on_planar_data() {
        let observations = grid(
            &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (2.0, 2.0)],
            |x1, x2| 3.0 + x1 + x2,
        );
        let resolved = selector().select(&observations, FitMethod::AutoDetect, Dimensionality::Two);
        assert_eq!(resolved.to_string(), "auto_linear");
    }

    #[test]
    fn test_distinct_rounded() {
        assert_eq!(distinct_rounded([1.0, 1.2, 0.8, 2.0].into_iter()), 2);
        assert_eq!(distinct_rounded([f64::NAN, 4.0].into_iter()), 1);
    }
}
