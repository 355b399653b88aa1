//! Error handling for latcast
//!
//! Provides a unified error type and result type for use across all latcast components.

/// Result type alias for latcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for latcast
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// Invalid request or parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No benchmark observations exist for the requested model
    #[error("Insufficient data: {0}")]
    NoData(String),

    /// Storage collaborator failures
    #[error("Observation source error: {0}")]
    Source(String),

    /// Configuration parsing errors
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an insufficient data error
    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    /// Create an observation source error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Check if this error indicates a client-side problem
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration(_)
                | Error::InvalidRequest(_)
                | Error::NoData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("invalid threshold");
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert_eq!(err.to_string(), "Configuration error: invalid threshold");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::invalid_request("bad tokens").is_client_error());
        assert!(Error::no_data("llama-7b").is_client_error());
        assert!(Error::config("bad threshold").is_client_error());
        assert!(!Error::storage("store offline").is_client_error());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = config::ConfigError::Message("missing key".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("missing key"));
    }
}
