// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the sketch pad

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Landmark provider errors
    Provider(ProviderError),
    /// Classification errors
    Classify(ClassifyError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Image encoding/decoding errors
    Image(String),
    /// Generic error with message
    Other(String),
}

/// Landmark provider errors
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// A detection line could not be parsed
    MalformedFrame(String),
    /// The detector reported an error for a frame
    DetectorFailed(String),
    /// The detector process could not be started
    SpawnFailed(String),
    /// The trace file could not be read
    TraceUnreadable(String),
}

/// Classification errors
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// No classifier command configured
    NotConfigured,
    /// The classifier process failed to run or exited unsuccessfully
    ProcessFailed(String),
    /// The classifier output could not be parsed
    InvalidOutput(String),
    /// The classifier returned no results
    EmptyResult,
    /// A result carried a confidence outside [0, 1]
    ConfidenceOutOfRange(f32),
    /// The snapshot could not be encoded
    EncodingFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Provider(e) => write!(f, "Landmark provider error: {}", e),
            AppError::Classify(e) => write!(f, "Classification error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::MalformedFrame(msg) => write!(f, "Malformed detection frame: {}", msg),
            ProviderError::DetectorFailed(msg) => write!(f, "Detector failed: {}", msg),
            ProviderError::SpawnFailed(msg) => write!(f, "Failed to start detector: {}", msg),
            ProviderError::TraceUnreadable(msg) => write!(f, "Cannot read trace: {}", msg),
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::NotConfigured => write!(f, "No classifier command configured"),
            ClassifyError::ProcessFailed(msg) => write!(f, "Classifier process failed: {}", msg),
            ClassifyError::InvalidOutput(msg) => write!(f, "Invalid classifier output: {}", msg),
            ClassifyError::EmptyResult => write!(f, "Classifier returned no results"),
            ClassifyError::ConfidenceOutOfRange(c) => {
                write!(f, "Confidence {} is outside [0, 1]", c)
            }
            ClassifyError::EncodingFailed(msg) => write!(f, "Snapshot encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ProviderError {}
impl std::error::Error for ClassifyError {}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err)
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        AppError::Classify(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

impl From<image::ImageError> for ClassifyError {
    fn from(err: image::ImageError) -> Self {
        ClassifyError::EncodingFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::MalformedFrame(err.to_string())
    }
}
