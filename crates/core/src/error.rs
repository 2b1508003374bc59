use thiserror::Error;

use crate::types::Segment;

pub type MatrixResult<T> = Result<T, MatrixError>;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Unknown scale format: {0}")]
    ScaleFormat(String),

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    #[error("Midpoint ({sat}, {loy}) lies outside the configured scales")]
    MidpointOutOfScale { sat: f64, loy: f64 },

    #[error("Manual assignment for {id} targets {segment}, which cannot be assigned")]
    InvalidAssignment { id: String, segment: Segment },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
