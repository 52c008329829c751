//! Error types for the waveform visualizer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("Drawing surface unavailable: {0}")]
    Surface(String),
    #[error("Invalid waveform configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid color '{value}' for {field}")]
    InvalidColor { field: &'static str, value: String },
    #[error("Malformed audio samples: {0}")]
    MalformedSamples(String),
    #[error("Failed to present frame: {0}")]
    Render(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VisualizerError>;
