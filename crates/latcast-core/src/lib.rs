//! # latcast-core
//!
//! Core types, traits, and utilities for latcast - a latency and throughput
//! predictor for language-model deployments.
//!
//! This crate provides the foundational data structures and interfaces that are
//! shared across all other latcast components. It includes:
//!
//! - Benchmark rows, aggregated observations and prediction results
//! - The storage collaborator trait that feeds the prediction engine
//! - Configuration schema and loading utilities
//! - Error handling types and utilities

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{Config, LoggingConfig, PredictorConfig};
pub use error::{Error, Result};
pub use traits::ObservationSource;
pub use types::{
    Confidence, FitMethod, MetricSet, MetricStats, Observation, PredictionRequest,
    PredictionResult, RawRow, ResolvedMethod,
};
