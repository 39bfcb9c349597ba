//! Core error types for pomobar-core.
//!
//! Only configuration and service errors reach callers of the timer API.
//! Delivery and audio errors are produced by the notification collaborators
//! and are logged there; they never propagate into a state transition.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomobar-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Event delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Audio cue errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// The timer service task is no longer running
    #[error("Timer service has stopped")]
    ServiceStopped,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Event delivery errors.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Payload could not be encoded
    #[error("Failed to encode event payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Transport-level failure (connect, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// API-key header name or value is not a valid HTTP header
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Audio cue errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No resource exists for the cue in any supported format
    #[error("Sound not found: {0}")]
    NotFound(String),

    /// Resource exists but could not be read or decoded
    #[error("Failed to load sound {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Output device or playback thread failure
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
