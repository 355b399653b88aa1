//! Confidence scoring against the observed token envelope

use latcast_core::config::ConfidenceConfig;
use latcast_core::{Confidence, Observation};
use serde::{Deserialize, Serialize};

/// Inputs and outcome of a confidence decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    /// Smallest range-normalized distance from the target to any observation
    pub min_distance: f64,
    /// Whether the target leaves the observed min/max envelope
    pub extrapolating: bool,
    pub confidence: Confidence,
}

/// Rates how well observations surround a target point
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
}

impl Span {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |span, v| match span {
            None => Some(Span { min: v, max: v }),
            Some(s) => Some(Span {
                min: s.min.min(v),
                max: s.max.max(v),
            }),
        })
    }

    fn range(&self) -> f64 {
        self.max - self.min
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Range-normalized offset; zero when the feature does not vary
    fn normalized(&self, from: f64, to: f64) -> f64 {
        let range = self.range();
        if range > 0.0 && range.is_finite() {
            (from - to) / range
        } else {
            0.0
        }
    }
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self::with_config(ConfidenceConfig::default())
    }

    pub fn with_config(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// Label a target point; an empty observation set is always `Low`
    pub fn score(&self, observations: &[Observation], target_input: f64, target_output: f64) -> Confidence {
        self.assess(observations, target_input, target_output).confidence
    }

    pub fn assess(
        &self,
        observations: &[Observation],
        target_input: f64,
        target_output: f64,
    ) -> ConfidenceAssessment {
        let spans = (
            Span::of(observations.iter().map(|o| o.input_tokens)),
            Span::of(observations.iter().map(|o| o.output_tokens)),
        );
        let (input_span, output_span) = match spans {
            (Some(input), Some(output)) => (input, output),
            _ => {
                return ConfidenceAssessment {
                    min_distance: f64::INFINITY,
                    extrapolating: true,
                    confidence: Confidence::Low,
                }
            }
        };

        let min_distance = observations
            .iter()
            .map(|obs| {
                let di = input_span.normalized(obs.input_tokens, target_input);
                let dout = output_span.normalized(obs.output_tokens, target_output);
                (di * di + dout * dout).sqrt()
            })
            .filter(|d| d.is_finite())
            .fold(f64::INFINITY, f64::min);

        let extrapolating =
            !input_span.contains(target_input) || !output_span.contains(target_output);

        let confidence = if min_distance < self.config.high_distance && !extrapolating {
            Confidence::High
        } else if min_distance < self.config.medium_distance || !extrapolating {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        ConfidenceAssessment {
            min_distance,
            extrapolating,
            confidence,
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latcast_core::MetricSet;

    fn observations() -> Vec<Observation> {
        [(100.0, 50.0), (500.0, 50.0), (100.0, 250.0), (500.0, 250.0)]
            .iter()
            .map(|&(i, o)| Observation::new(i, o, MetricSet::default()))
            .collect()
    }

    #[test]
    fn test_exact_match_is_high() {
        let scorer = ConfidenceScorer::new();
        let assessment = scorer.assess(&observations(), 500.0, 250.0);
        assert_eq!(assessment.min_distance, 0.0);
        assert!(!assessment.extrapolating);
        assert_eq!(assessment.confidence, Confidence::High);
    }

    #[test]
    fn test_interior_point_far_from_observations_is_medium() {
        // centre of the grid: normalized distance sqrt(0.5^2 + 0.5^2) ~ 0.707
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&observations(), 300.0, 150.0), Confidence::Medium);
    }

    #[test]
    fn test_near_extrapolation_is_medium() {
        // just outside the input envelope, 0.05 normalized from the nearest corner
        let scorer = ConfidenceScorer::new();
        let assessment = scorer.assess(&observations(), 520.0, 250.0);
        assert!(assessment.extrapolating);
        assert_eq!(assessment.confidence, Confidence::Medium);
    }

    #[test]
    fn test_far_extrapolation_is_low() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&observations(), 10_000.0, 4_000.0), Confidence::Low);
    }

    #[test]
    fn test_zero_range_feature_contributes_nothing() {
        let observations: Vec<Observation> = [100.0, 200.0, 300.0]
            .iter()
            .map(|&i| Observation::new(i, 64.0, MetricSet::default()))
            .collect();
        let scorer = ConfidenceScorer::new();

        let assessment = scorer.assess(&observations, 200.0, 64.0);
        assert_eq!(assessment.min_distance, 0.0);
        assert_eq!(assessment.confidence, Confidence::High);

        // off the single observed output length: extrapolating, distance still finite
        let assessment = scorer.assess(&observations, 200.0, 128.0);
        assert!(assessment.extrapolating);
        assert!(assessment.min_distance.is_finite());
        assert_eq!(assessment.confidence, Confidence::Medium);
    }

    #[test]
    fn test_empty_observations_are_low() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[], 1.0, 1.0), Confidence::Low);
    }

    #[test]
    fn test_custom_thresholds() {
        let scorer = ConfidenceScorer::with_config(ConfidenceConfig {
            high_distance: 0.8,
            medium_distance: 0.9,
        });
        assert_eq!(scorer.score(&observations(), 300.0, 150.0), Confidence::High);
    }
}
