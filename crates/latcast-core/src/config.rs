//! Configuration management for latcast
//!
//! Provides a unified configuration system that supports YAML files and
//! environment variable overrides on top of built-in defaults.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for latcast components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prediction engine tuning
    pub predictor: PredictorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Configuration file
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        // Start with defaults
        builder = builder.add_source(config::Config::try_from(&Self::default())?);

        if let Ok(config_path) = std::env::var("LATCAST_CONFIG") {
            builder = builder.add_source(config::File::with_name(&config_path).required(false));
        } else {
            builder = builder.add_source(config::File::with_name("./latcast").required(false));
        }

        // LATCAST_PREDICTOR__SOLVER__MAX_ITERATIONS=200 style overrides
        builder = builder.add_source(
            config::Environment::with_prefix("LATCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let parsed: Self = config.try_deserialize()?;

        parsed.validate()?;

        Ok(parsed)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path));

        let config = builder.build()?;
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;

        Ok(parsed)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.predictor.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Tuning knobs for the prediction engine.
///
/// The thresholds are empirical; the defaults reproduce the reference behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Confidence classification thresholds
    pub confidence: ConfidenceConfig,

    /// Auto-detect thresholds
    pub linearity: LinearityConfig,

    /// Iterative solver settings
    pub solver: SolverConfig,

    /// Traffic level assumed for observations that did not record one
    pub default_traffic_level: f64,

    /// Generation rate used when predicted per-user TPS is unusable
    pub fallback_tokens_per_ms: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceConfig::default(),
            linearity: LinearityConfig::default(),
            solver: SolverConfig::default(),
            default_traffic_level: 0.5,
            fallback_tokens_per_ms: 0.1,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<()> {
        self.confidence.validate()?;
        self.linearity.validate()?;
        self.solver.validate()?;

        if !self.default_traffic_level.is_finite() || self.default_traffic_level < 0.0 {
            return Err(crate::Error::config(
                "default_traffic_level must be a non-negative number",
            ));
        }
        if !self.fallback_tokens_per_ms.is_finite() || self.fallback_tokens_per_ms <= 0.0 {
            return Err(crate::Error::config("fallback_tokens_per_ms must be positive"));
        }

        Ok(())
    }
}

/// Normalized-distance thresholds for confidence labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Below this distance an interpolated target is `high`
    pub high_distance: f64,

    /// Below this distance a target is at least `medium`
    pub medium_distance: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            high_distance: 0.1,
            medium_distance: 0.3,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.high_distance.is_finite() && self.high_distance > 0.0) {
            return Err(crate::Error::config("confidence.high_distance must be positive"));
        }
        if !(self.medium_distance.is_finite() && self.medium_distance > 0.0) {
            return Err(crate::Error::config("confidence.medium_distance must be positive"));
        }
        if self.high_distance > self.medium_distance {
            return Err(crate::Error::config(
                "confidence.high_distance must not exceed confidence.medium_distance",
            ));
        }
        Ok(())
    }
}

/// R² thresholds used when auto-detecting the fit method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearityConfig {
    /// Polynomial must beat linear R² by at least this much
    pub min_r2_gain: f64,

    /// Linear R² above which linear is always chosen
    pub linear_r2: f64,
}

impl Default for LinearityConfig {
    fn default() -> Self {
        Self {
            min_r2_gain: 0.10,
            linear_r2: 0.85,
        }
    }
}

impl LinearityConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("min_r2_gain", self.min_r2_gain), ("linear_r2", self.linear_r2)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::config(format!(
                    "linearity.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the normal-equation solvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Fixed number of Gauss-Seidel sweeps
    pub max_iterations: usize,

    /// Diagonal terms smaller than this skip their update
    pub pivot_epsilon: f64,

    /// Determinant magnitude below which the 2x2 system is treated as singular
    pub singular_determinant: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            pivot_epsilon: 1e-10,
            singular_determinant: 1e-10,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(crate::Error::config("solver.max_iterations must be greater than 0"));
        }
        if !(self.pivot_epsilon.is_finite() && self.pivot_epsilon >= 0.0) {
            return Err(crate::Error::config("solver.pivot_epsilon must be non-negative"));
        }
        if !(self.singular_determinant.is_finite() && self.singular_determinant >= 0.0) {
            return Err(crate::Error::config(
                "solver.singular_determinant must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log format (json, text)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(crate::Error::config(format!("Unknown log level: {}", other)));
            }
        }
        match self.format.to_lowercase().as_str() {
            "json" | "text" => Ok(()),
            other => Err(crate::Error::config(format!("Unknown log format: {}", other))),
        }
    }
}
