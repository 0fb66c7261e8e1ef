//! # Serial Simple
//!
//! A minimal serial terminal built with the Bevy game engine.
//!
//! The application connects to a serial port, shows incoming bytes as text,
//! and sends user-entered lines terminated by a configurable line ending.
//! Basic settings (baud rate, port, terminator, window geometry) persist to a
//! JSON file next to the executable, and available ports are re-enumerated in
//! the background while disconnected.
//!
//! ## Architecture
//!
//! The project is organized into the following modules:
//!
//! - [`serial`]: Serial port communication (port watcher, reader/writer loop)
//! - [`serial_ui`]: User interface components for the terminal
//! - [`settings`]: Persistent application settings
//! - [`error`]: Custom error types for the application

pub mod error;
pub mod serial;
pub mod serial_ui;
pub mod settings;

/// Application name shown in the window title.
pub const APP_NAME: &str = "serialsimple";

/// Application version shown in the window title.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-exports for convenience
pub mod prelude {
    pub use crate::error::*;
    pub use crate::serial::SerialPlugin;
    pub use crate::serial_ui::SerialUiPlugin;
    pub use crate::settings::{Settings, Terminator};
}
