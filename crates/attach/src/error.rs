use thiserror::Error;

/// Result type for comment attachment operations
pub type Result<T> = std::result::Result<T, AttachError>;

/// Errors that can occur while configuring or running comment attachment
#[derive(Error, Debug)]
pub enum AttachError {
    /// A collaborator required by the current configuration was never supplied
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An aggregator produced a negative value for a candidate
    #[error("Aggregator returned a negative value: {value}")]
    NegativeAggregate { value: f64 },

    /// An aggregator produced NaN or an infinite value for a candidate
    #[error("Aggregator returned a non-finite value: {value}")]
    NonFiniteAggregate { value: f64 },

    /// A target name could not be turned into a search pattern
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl AttachError {
    /// Create a missing configuration error
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingConfiguration(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
