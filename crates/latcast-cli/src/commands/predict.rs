//! Prediction command

use crate::output::{
    colorize_confidence, format_millis, format_rate, format_tokens, OutputFormat, OutputFormatter,
};
use anyhow::{Context, Result};
use latcast_core::{Config, FitMethod, PredictionRequest, PredictionResult};
use latcast_predict::Predictor;
use tracing::info;

/// Target point and method for a single prediction
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub model: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub traffic_level: Option<f64>,
    pub method: FitMethod,
}

impl PredictArgs {
    fn into_request(self) -> PredictionRequest {
        let mut request = PredictionRequest::new(self.model, self.input_tokens, self.output_tokens)
            .with_method(self.method);
        request.target_traffic_level = self.traffic_level;
        request
    }
}

/// Predict metrics for a model; a model without data is an error
pub fn predict<S>(
    source: &S,
    config: &Config,
    args: PredictArgs,
    output_format: OutputFormat,
) -> Result<()>
where
    S: latcast_core::ObservationSource,
{
    let formatter = OutputFormatter::new(output_format);
    let predictor = Predictor::with_config(config.predictor.clone());
    let request = args.into_request();

    let result = run_prediction(&predictor, source, &request)?;
    info!(
        "Predicted {} with {} ({} confidence)",
        result.model_name, result.method, result.confidence
    );

    formatter.print_metrics(&result, &prediction_rows(&result, output_format))
}

fn run_prediction<S>(
    predictor: &Predictor,
    source: &S,
    request: &PredictionRequest,
) -> Result<PredictionResult>
where
    S: latcast_core::ObservationSource,
{
    let outcome = predictor
        .predict_for_model(source, request)
        .with_context(|| format!("Prediction for model '{}' failed", request.model_name))?;

    outcome.ok_or_else(|| {
        latcast_core::Error::no_data(format!(
            "No benchmark data found for model '{}'",
            request.model_name
        ))
        .into()
    })
}

/// Key-value rows for the human-readable views
fn prediction_rows(result: &PredictionResult, output_format: OutputFormat) -> Vec<(String, String)> {
    let confidence = if output_format == OutputFormat::Table {
        colorize_confidence(result.confidence).to_string()
    } else {
        result.confidence.to_string()
    };
    let traffic = result
        .target_traffic_level
        .map(|t| format!("{}", t))
        .unwrap_or_else(|| "-".to_string());

    let mut rows = vec![
        ("model".to_string(), result.model_name.clone()),
        ("method".to_string(), result.method.to_string()),
        ("confidence".to_string(), confidence),
        (
            "observations_used".to_string(),
            result.num_observations_used.to_string(),
        ),
        (
            "target_input_tokens".to_string(),
            format_tokens(result.target_input_tokens),
        ),
        (
            "target_output_tokens".to_string(),
            format_tokens(result.target_output_tokens),
        ),
        ("target_traffic_level".to_string(), traffic),
    ];

    for (name, value) in result.predictions.named_values() {
        let formatted = if name.starts_with("user_tps") || name == "throughput" {
            format_rate(value)
        } else {
            format_millis(value)
        };
        rows.push((name.to_string(), formatted));
    }
    rows
}
