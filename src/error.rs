use thiserror::Error;

/// ConfigurationError is raised while loading or validating reference data
/// and comparator settings, never during a live comparison.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("reference data is missing required region `{0}`")]
    MissingRegion(String),

    #[error("composition anchor `{0}` needs reference data that was not provided")]
    MissingAnchor(&'static str),

    #[error("reference value for `{0}` is not a finite number")]
    NonFiniteReference(String),

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("smoothing factor must be within [0, 1), got {0}")]
    InvalidSmoothingFactor(f32),

    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),
}
