use std::path::PathBuf;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Intake Error: {0}")]
    Intake(#[from] IntakeError),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
}

// Configuration Error Type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read frame directory {1}: {0}")]
    ReadDirectory(std::io::Error, PathBuf),
    #[error("Failed to read reference log {1}: {0}")]
    ReadReference(std::io::Error, PathBuf),
    #[error("Frame decoding task failed: {0}")]
    DecodeTask(String),
    #[error("The frame channel is closed.")]
    ChannelClosed,
}
