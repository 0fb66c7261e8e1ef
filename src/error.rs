//! # Error Module
//!
//! This module provides custom error types for the `serial_simple` application.
//! It uses the `thiserror` crate for ergonomic error handling.

use thiserror::Error;

/// Result type alias for `serial_simple` operations.
pub type Result<T> = std::result::Result<T, SerialSimpleError>;

/// Main error type for the `serial_simple` application.
#[derive(Debug, Error)]
pub enum SerialSimpleError {
    /// Failed to open serial port.
    #[error("Failed to open serial port '{port_name}': {reason}")]
    PortOpen { port_name: String, reason: String },

    /// Settings file I/O failed.
    #[error("Settings file error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings file contents could not be parsed or serialized.
    #[error("Settings format error: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    /// Window geometry string is not of the form `WIDTHxHEIGHT`.
    #[error("Invalid window geometry '{0}'")]
    InvalidGeometry(String),
}

impl SerialSimpleError {
    /// Creates a new port open error.
    #[must_use]
    pub fn port_open(port_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PortOpen {
            port_name: port_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new geometry error.
    #[must_use]
    pub fn invalid_geometry(geometry: impl Into<String>) -> Self {
        Self::InvalidGeometry(geometry.into())
    }
}
