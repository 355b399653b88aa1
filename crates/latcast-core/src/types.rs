//! Core type definitions for latcast

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of scalar statistics carried by a [`MetricSet`].
pub const METRIC_COUNT: usize = 25;

/// Summary statistics for one metric family (TTFT, per-user TPS or E2E latency)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricStats {
    pub mean: f64,
    pub std: f64,
    pub p05: f64,
    pub p50: f64,
    pub p80: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

impl MetricStats {
    /// Statistic names in storage order
    pub const NAMES: [&'static str; 8] = ["mean", "std", "p05", "p50", "p80", "p95", "p99", "p999"];

    fn to_array(self) -> [f64; 8] {
        [
            self.mean, self.std, self.p05, self.p50, self.p80, self.p95, self.p99, self.p999,
        ]
    }

    fn from_slice(values: &[f64]) -> Self {
        Self {
            mean: values[0],
            std: values[1],
            p05: values[2],
            p50: values[3],
            p80: values[4],
            p95: values[5],
            p99: values[6],
            p999: values[7],
        }
    }
}

/// The full set of benchmark statistics for one data point.
///
/// Shared by raw rows, aggregated observations and predictions. Latencies are
/// in milliseconds; `user_tps` and `throughput` are tokens per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSet {
    /// Time to first token
    pub ttft: MetricStats,
    /// Per-user generation rate
    pub user_tps: MetricStats,
    /// End-to-end request latency
    pub e2e: MetricStats,
    /// Job-level aggregate tokens per second
    pub throughput: f64,
}

impl MetricSet {
    /// Index of `ttft.mean` in [`MetricSet::values`]
    pub const TTFT_MEAN: usize = 0;
    /// Index of `user_tps.mean` in [`MetricSet::values`]
    pub const USER_TPS_MEAN: usize = 8;
    /// Index of `e2e.mean` in [`MetricSet::values`]
    pub const E2E_MEAN: usize = 16;
    /// Index of `throughput` in [`MetricSet::values`]
    pub const THROUGHPUT: usize = 24;

    /// Flat statistic names, matching the order of [`MetricSet::values`]
    pub const FIELD_NAMES: [&'static str; METRIC_COUNT] = [
        "ttft_mean",
        "ttft_std",
        "ttft_p05",
        "ttft_p50",
        "ttft_p80",
        "ttft_p95",
        "ttft_p99",
        "ttft_p999",
        "user_tps_mean",
        "user_tps_std",
        "user_tps_p05",
        "user_tps_p50",
        "user_tps_p80",
        "user_tps_p95",
        "user_tps_p99",
        "user_tps_p999",
        "e2e_mean",
        "e2e_std",
        "e2e_p05",
        "e2e_p50",
        "e2e_p80",
        "e2e_p95",
        "e2e_p99",
        "e2e_p999",
        "throughput",
    ];

    /// Flatten into ttft(8), user_tps(8), e2e(8), throughput
    pub fn values(&self) -> [f64; METRIC_COUNT] {
        let mut out = [0.0; METRIC_COUNT];
        out[0..8].copy_from_slice(&self.ttft.to_array());
        out[8..16].copy_from_slice(&self.user_tps.to_array());
        out[16..24].copy_from_slice(&self.e2e.to_array());
        out[24] = self.throughput;
        out
    }

    /// Inverse of [`MetricSet::values`]
    pub fn from_values(values: [f64; METRIC_COUNT]) -> Self {
        Self {
            ttft: MetricStats::from_slice(&values[0..8]),
            user_tps: MetricStats::from_slice(&values[8..16]),
            e2e: MetricStats::from_slice(&values[16..24]),
            throughput: values[24],
        }
    }

    /// Replace negative and non-finite statistics with zero
    pub fn clamp_non_negative(self) -> Self {
        let mut values = self.values();
        for value in values.iter_mut() {
            if !value.is_finite() || *value < 0.0 {
                *value = 0.0;
            }
        }
        Self::from_values(values)
    }

    /// Iterate `(name, value)` pairs in storage order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::FIELD_NAMES.into_iter().zip(self.values())
    }
}

/// One benchmark row as recorded by the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Benchmark run that produced the row
    pub benchmark_id: String,
    /// Deployment target the benchmark ran against
    pub model_name: String,
    /// Average input length for the row, in tokens
    pub input_tokens: f64,
    /// Average output length for the row, in tokens
    pub output_tokens: f64,
    /// Offered load, if the benchmark recorded one
    #[serde(default)]
    pub traffic_level: Option<f64>,
    /// Recorded statistics; absent fields read as zero
    #[serde(flatten)]
    pub metrics: MetricSet,
}

/// One averaged benchmark data point.
///
/// Built by the aggregator from every raw row sharing the same benchmark run,
/// input length, output length and traffic level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub benchmark_id: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub traffic_level: Option<f64>,
    /// Number of raw rows averaged into this observation
    pub sample_count: usize,
    pub metrics: MetricSet,
}

impl Observation {
    /// Build an observation at a token point with no traffic level
    pub fn new(input_tokens: f64, output_tokens: f64, metrics: MetricSet) -> Self {
        Self {
            benchmark_id: String::new(),
            input_tokens,
            output_tokens,
            traffic_level: None,
            sample_count: 1,
            metrics,
        }
    }

    /// Attach a traffic level
    pub fn with_traffic(mut self, traffic_level: f64) -> Self {
        self.traffic_level = Some(traffic_level);
        self
    }
}

/// Curve-fitting method requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Choose between linear and polynomial from goodness of fit
    #[default]
    AutoDetect,
    /// Quadratic surface with interaction terms
    Polynomial,
    /// Multivariate linear regression
    Linear,
    /// Arithmetic mean of every observation
    Average,
}

impl FitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMethod::AutoDetect => "auto_detect",
            FitMethod::Polynomial => "polynomial",
            FitMethod::Linear => "linear",
            FitMethod::Average => "average",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FitMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto_detect" | "auto" => Ok(FitMethod::AutoDetect),
            "polynomial" => Ok(FitMethod::Polynomial),
            "linear" => Ok(FitMethod::Linear),
            "average" => Ok(FitMethod::Average),
            _ => Err(crate::Error::invalid_request(format!(
                "Unknown prediction method: {}",
                s
            ))),
        }
    }
}

/// The method that actually produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMethod {
    /// Concrete fitter; never `AutoDetect`
    pub method: FitMethod,
    /// Whether auto-detect made the choice
    pub auto_detected: bool,
}

impl ResolvedMethod {
    pub fn explicit(method: FitMethod) -> Self {
        Self {
            method,
            auto_detected: false,
        }
    }

    pub fn auto(method: FitMethod) -> Self {
        Self {
            method,
            auto_detected: true,
        }
    }

    /// Canonical name, `auto_*` prefixed when auto-detect chose the method
    pub fn name(&self) -> &'static str {
        match (self.auto_detected, self.method) {
            (true, FitMethod::Average) => "auto_simple_average",
            (true, FitMethod::Linear) => "auto_linear",
            (true, FitMethod::Polynomial) => "auto_polynomial",
            (_, method) => method.as_str(),
        }
    }
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How well a prediction is supported by nearby observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// A request to predict metrics at a target token point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub model_name: String,
    pub target_input_tokens: f64,
    pub target_output_tokens: f64,
    #[serde(default)]
    pub target_traffic_level: Option<f64>,
    #[serde(default)]
    pub method: FitMethod,
}

impl PredictionRequest {
    /// Create an auto-detect request with no traffic level
    pub fn new(model_name: impl Into<String>, input_tokens: f64, output_tokens: f64) -> Self {
        Self {
            model_name: model_name.into(),
            target_input_tokens: input_tokens,
            target_output_tokens: output_tokens,
            target_traffic_level: None,
            method: FitMethod::AutoDetect,
        }
    }

    pub fn with_method(mut self, method: FitMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_traffic(mut self, traffic_level: f64) -> Self {
        self.target_traffic_level = Some(traffic_level);
        self
    }

    /// Check the request before it reaches the fitters
    pub fn validate(&self) -> crate::Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(crate::Error::invalid_request("Model name must not be empty"));
        }
        for (label, value) in [
            ("input", self.target_input_tokens),
            ("output", self.target_output_tokens),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::Error::invalid_request(format!(
                    "Target {} tokens must be a positive number, got {}",
                    label, value
                )));
            }
        }
        if let Some(traffic) = self.target_traffic_level {
            if !traffic.is_finite() || traffic < 0.0 {
                return Err(crate::Error::invalid_request(format!(
                    "Traffic level must be a non-negative number, got {}",
                    traffic
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub model_name: String,
    pub target_input_tokens: f64,
    pub target_output_tokens: f64,
    pub target_traffic_level: Option<f64>,
    pub predictions: MetricSet,
    pub confidence: Confidence,
    pub num_observations_used: usize,
    pub method: ResolvedMethod,
}
