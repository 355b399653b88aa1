//! Prediction engine

use crate::aggregate::aggregate_rows;
use crate::confidence::ConfidenceScorer;
use crate::fit::{
    AverageFitter, CurveFitter, Dimensionality, LinearFitter, PolynomialFitter, TargetPoint,
};
use crate::mechanistic::derive_e2e_mean;
use crate::selector::MethodSelector;
use crate::{PredictError, Result};
use latcast_core::config::PredictorConfig;
use latcast_core::{
    FitMethod, Observation, ObservationSource, PredictionRequest, PredictionResult,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Envelope of an observation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSummary {
    pub count: usize,
    pub raw_rows: usize,
    pub min_input_tokens: f64,
    pub max_input_tokens: f64,
    pub min_output_tokens: f64,
    pub max_output_tokens: f64,
    /// Distinct recorded traffic levels, ascending
    pub traffic_levels: Vec<f64>,
}

/// Stateless latency/throughput predictor.
///
/// Holds only configuration, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Predictor {
    config: PredictorConfig,
    selector: MethodSelector,
    scorer: ConfidenceScorer,
}

impl Predictor {
    /// Create a predictor with default thresholds
    pub fn new() -> Self {
        Self::with_config(PredictorConfig::default())
    }

    /// Create a predictor with configuration
    pub fn with_config(config: PredictorConfig) -> Self {
        Self {
            selector: MethodSelector::new(config.clone()),
            scorer: ConfidenceScorer::with_config(config.confidence.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Predict metrics at the request's target from pre-aggregated observations.
    ///
    /// Returns `Ok(None)` when there are no observations to fit.
    pub fn predict(
        &self,
        observations: &[Observation],
        request: &PredictionRequest,
    ) -> Result<Option<PredictionResult>> {
        request.validate().map_err(|e| match e {
            latcast_core::Error::InvalidRequest(msg) => PredictError::InvalidRequest(msg),
            other => PredictError::Core(other),
        })?;

        if observations.is_empty() {
            debug!("No observations for model {}", request.model_name);
            return Ok(None);
        }

        let dims = Dimensionality::for_traffic(request.target_traffic_level);
        let resolved = self.selector.select(observations, request.method, dims);
        let fitter = self.fitter(resolved.method, dims);

        let target = TargetPoint::new(
            request.target_input_tokens,
            request.target_output_tokens,
            request.target_traffic_level,
        );
        let mut predictions = fitter.fit(observations, &target);

        // Traffic-aware requests keep the regressed E2E mean.
        if dims == Dimensionality::Two && fitter.method() != FitMethod::Average {
            predictions.e2e.mean = derive_e2e_mean(
                predictions.ttft.mean,
                Some(predictions.user_tps.mean),
                request.target_output_tokens,
                self.config.fallback_tokens_per_ms,
            );
        }
        let predictions = predictions.clamp_non_negative();

        let confidence = match fitter.confidence_override(observations.len()) {
            Some(confidence) => confidence,
            None => {
                let assessment = self.scorer.assess(
                    observations,
                    request.target_input_tokens,
                    request.target_output_tokens,
                );
                debug!(
                    "Confidence inputs: min distance {:.4}, extrapolating {}",
                    assessment.min_distance, assessment.extrapolating
                );
                assessment.confidence
            }
        };

        debug!(
            "Predicted {} at ({}, {}) with {} from {} observations: {} confidence",
            request.model_name,
            request.target_input_tokens,
            request.target_output_tokens,
            resolved,
            observations.len(),
            confidence
        );

        Ok(Some(PredictionResult {
            model_name: request.model_name.clone(),
            target_input_tokens: request.target_input_tokens,
            target_output_tokens: request.target_output_tokens,
            target_traffic_level: request.target_traffic_level,
            predictions,
            confidence,
            num_observations_used: observations.len(),
            method: resolved,
        }))
    }

    /// Fetch and aggregate the model's rows, then predict.
    ///
    /// Observations are rebuilt on every call.
    pub fn predict_for_model<S>(
        &self,
        source: &S,
        request: &PredictionRequest,
    ) -> Result<Option<PredictionResult>>
    where
        S: ObservationSource + ?Sized,
    {
        let observations = self.load_observations(source, &request.model_name)?;
        self.predict(&observations, request)
    }

    /// Evaluate independent requests in parallel, preserving input order
    pub fn predict_batch<S>(
        &self,
        source: &S,
        requests: &[PredictionRequest],
    ) -> Vec<Result<Option<PredictionResult>>>
    where
        S: ObservationSource + ?Sized,
    {
        requests
            .par_iter()
            .map(|request| self.predict_for_model(source, request))
            .collect()
    }

    /// Aggregated observations for a model, in deterministic order
    pub fn load_observations<S>(&self, source: &S, model_name: &str) -> Result<Vec<Observation>>
    where
        S: ObservationSource + ?Sized,
    {
        let rows = source.fetch_rows(model_name)?;
        Ok(aggregate_rows(&rows))
    }

    /// Summarize the envelope of an observation set; `None` when empty
    pub fn summarize(observations: &[Observation]) -> Option<ObservationSummary> {
        let first = observations.first()?;
        let mut summary = ObservationSummary {
            count: observations.len(),
            raw_rows: 0,
            min_input_tokens: first.input_tokens,
            max_input_tokens: first.input_tokens,
            min_output_tokens: first.output_tokens,
            max_output_tokens: first.output_tokens,
            traffic_levels: Vec::new(),
        };

        for obs in observations {
            summary.raw_rows += obs.sample_count;
            summary.min_input_tokens = summary.min_input_tokens.min(obs.input_tokens);
            summary.max_input_tokens = summary.max_input_tokens.max(obs.input_tokens);
            summary.min_output_tokens = summary.min_output_tokens.min(obs.output_tokens);
            summary.max_output_tokens = summary.max_output_tokens.max(obs.output_tokens);
            if let Some(traffic) = obs.traffic_level {
                summary.traffic_levels.push(traffic);
            }
        }
        summary.traffic_levels.sort_by(f64::total_cmp);
        summary.traffic_levels.dedup();

        Some(summary)
    }

    fn fitter(&self, method: FitMethod, dims: Dimensionality) -> Box<dyn CurveFitter> {
        match method {
            FitMethod::Linear => Box::new(LinearFitter::new(dims, &self.config)),
            FitMethod::Polynomial => Box::new(PolynomialFitter::new(dims, &self.config)),
            // The selector never resolves to AutoDetect.
            FitMethod::Average | FitMethod::AutoDetect => Box::new(AverageFitter::new()),
        }
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}
