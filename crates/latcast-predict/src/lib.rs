//! # latcast-predict
//!
//! Prediction engine for latcast.
//!
//! This crate provides:
//! - Aggregation of raw benchmark rows into observations
//! - Method selection with graceful downgrades for sparse data
//! - Average, linear and polynomial curve fitters in two or three dimensions
//! - Mechanistic end-to-end latency derivation
//! - Confidence scoring against the observed envelope
//! - An in-memory observation store for tests and the CLI
//!
//! ## Example
//!
//! ```rust
//! use latcast_core::{FitMethod, MetricSet, PredictionRequest, RawRow};
//! use latcast_predict::{InMemoryStore, Predictor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! for (input, output, ttft) in [(128.0, 64.0, 40.0), (512.0, 64.0, 90.0), (512.0, 256.0, 95.0)] {
//!     let mut metrics = MetricSet::default();
//!     metrics.ttft.mean = ttft;
//!     metrics.user_tps.mean = 45.0;
//!     store.insert_row(RawRow {
//!         benchmark_id: "run-1".to_string(),
//!         model_name: "llama-7b".to_string(),
//!         input_tokens: input,
//!         output_tokens: output,
//!         traffic_level: None,
//!         metrics,
//!     });
//! }
//!
//! let predictor = Predictor::new();
//! let request = PredictionRequest::new("llama-7b", 256.0, 128.0).with_method(FitMethod::Linear);
//! if let Some(result) = predictor.predict_for_model(&store, &request)? {
//!     println!("ttft ~ {:.1} ms ({})", result.predictions.ttft.mean, result.confidence);
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod aggregate;
pub mod confidence;
pub mod engine;
pub mod fit;
pub mod linearity;
pub mod mechanistic;
pub mod selector;
pub mod store;

// Re-export commonly used types
pub use aggregate::aggregate_rows;
pub use confidence::ConfidenceScorer;
pub use engine::{ObservationSummary, Predictor};
pub use fit::{AverageFitter, CurveFitter, Dimensionality, LinearFitter, PolynomialFitter};
pub use linearity::LinearityDetector;
pub use mechanistic::derive_e2e_mean;
pub use selector::MethodSelector;
pub use store::InMemoryStore;

/// Result type for prediction operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// Errors that can occur while producing a prediction
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] latcast_core::Error),
}

impl PredictError {
    /// Whether the caller can fix the failure by changing its input
    pub fn is_client_error(&self) -> bool {
        match self {
            PredictError::InvalidRequest(_) => true,
            PredictError::Core(err) => err.is_client_error(),
        }
    }
}
