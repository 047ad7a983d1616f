use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Video source error: {0}")]
    Source(#[from] SourceError),
    #[error("Detector error: {0}")]
    Detector(String),
    #[error("Detector did not respond within {0:?}")]
    DetectorTimeout(Duration),
    #[error("Accumulator error: {0}")]
    Accumulator(#[from] AccumulatorError),
    #[error("Failed to write export to {1}: {0}")]
    Export(std::io::Error, PathBuf),
    #[error("Overlay error: {0}")]
    Overlay(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

// Video Source Error Type
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open {1}: {0}")]
    Open(std::io::Error, PathBuf),
    #[error("Failed to decode frame {1}: {0}")]
    Decode(image::ImageError, PathBuf),
    #[error("No frames found in {0}")]
    Empty(PathBuf),
    #[error("Frame rate must be a positive number, got {0}")]
    InvalidFrameRate(f64),
    #[error("Cannot seek to {0}s")]
    InvalidSeek(f64),
    #[error("The source has ended.")]
    Ended,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("Out of order append: expected frame index {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },
}
