//! # Settings Module
//!
//! Persistent application settings: baud rate, port name, line terminator and
//! window geometry. Settings are stored as pretty-printed JSON in
//! `settings.json` next to the executable. A file that is missing or cannot
//! be parsed falls back to defaults and is rewritten.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use bevy::window::WindowResolution;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SerialSimpleError};

/// File name of the settings file, resolved next to the executable.
const SETTINGS_FILE: &str = "settings.json";

/// Line terminator appended to every outbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    #[default]
    #[serde(rename = "LF")]
    Lf,
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "CR_LF")]
    CrLf,
    #[serde(rename = "LF_CR")]
    LfCr,
}

impl Terminator {
    /// All selectable terminators, in UI order.
    pub const ALL: [Terminator; 4] = [
        Terminator::Lf,
        Terminator::Cr,
        Terminator::CrLf,
        Terminator::LfCr,
    ];

    /// The byte sequence this terminator appends on the wire.
    #[must_use]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Terminator::Lf => b"\n",
            Terminator::Cr => b"\r",
            Terminator::CrLf => b"\r\n",
            Terminator::LfCr => b"\n\r",
        }
    }

    /// Label shown in the terminator selector.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Terminator::Lf => "LF",
            Terminator::Cr => "CR",
            Terminator::CrLf => "CR_LF",
            Terminator::LfCr => "LF_CR",
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Application settings, loaded on startup and saved on exit.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub baud: u32,
    pub port: String,
    pub terminator: Terminator,
    pub geometry: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            baud: 115_200,
            port: String::new(),
            terminator: Terminator::Lf,
            geometry: String::from("400x800"),
        }
    }
}

impl Settings {
    /// Resolve the settings file path next to the executable, falling back to
    /// the working directory when the executable path is unavailable.
    fn path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE)))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    /// Load settings from the default location.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load settings from `path`. Any failure (missing file, bad JSON,
    /// unknown terminator) falls back to defaults and rewrites the file.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Failed to load settings from {}: {e}; using defaults",
                    path.display()
                );
                let settings = Settings::default();
                if let Err(e) = settings.save_to(path) {
                    warn!("Failed to rewrite settings file: {e}");
                }
                settings
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save settings to `path` as pretty-printed JSON.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The persisted window geometry as a Bevy window resolution, falling
    /// back to the default geometry when the string does not parse.
    #[must_use]
    pub fn window_resolution(&self) -> WindowResolution {
        let (width, height) = match parse_geometry(&self.geometry) {
            Ok(size) => size,
            Err(e) => {
                warn!("{e}; using default geometry");
                parse_geometry(&Settings::default().geometry)
                    .expect("default geometry must parse")
            }
        };
        WindowResolution::new(width as f32, height as f32)
    }

    /// Record the current window size as the persisted geometry.
    pub fn set_geometry(&mut self, width: u32, height: u32) {
        self.geometry = format!("{width}x{height}");
    }
}

/// Parse a `WIDTHxHEIGHT` geometry string into pixel sizes.
pub fn parse_geometry(geometry: &str) -> Result<(u32, u32)> {
    let invalid = || SerialSimpleError::invalid_geometry(geometry);
    let (width, height) = geometry.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("serial_simple_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_settings_round_trip() {
        let path = temp_path("round_trip.json");
        let settings = Settings {
            baud: 9600,
            port: String::from("/dev/ttyACM0"),
            terminator: Terminator::CrLf,
            geometry: String::from("640x480"),
        };
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_falls_back_and_rewrites() {
        let path = temp_path("missing.json");
        let _ = fs::remove_file(&path);
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, Settings::default());
        // The defaults must have been written back out.
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_corrupt_file_falls_back_and_rewrites() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{ not json").unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, Settings::default());
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<Settings>(&rewritten).is_ok());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_unknown_terminator_falls_back() {
        let path = temp_path("terminator.json");
        fs::write(
            &path,
            r#"{"baud": 9600, "port": "", "terminator": "VT", "geometry": "400x800"}"#,
        )
        .unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_terminator_bytes() {
        assert_eq!(Terminator::Lf.as_bytes(), b"\n");
        assert_eq!(Terminator::Cr.as_bytes(), b"\r");
        assert_eq!(Terminator::CrLf.as_bytes(), b"\r\n");
        assert_eq!(Terminator::LfCr.as_bytes(), b"\n\r");
    }

    #[test]
    fn test_terminator_json_spelling() {
        assert_eq!(
            serde_json::to_string(&Terminator::CrLf).unwrap(),
            "\"CR_LF\""
        );
        let parsed: Terminator = serde_json::from_str("\"LF_CR\"").unwrap();
        assert_eq!(parsed, Terminator::LfCr);
    }

    #[test]
    fn test_parse_geometry() {
        assert_eq!(parse_geometry("400x800").unwrap(), (400, 800));
        assert_eq!(parse_geometry("1280x720").unwrap(), (1280, 720));
    }

    #[test]
    fn test_parse_geometry_rejects_garbage() {
        assert!(parse_geometry("").is_err());
        assert!(parse_geometry("400").is_err());
        assert!(parse_geometry("x800").is_err());
        assert!(parse_geometry("400x").is_err());
        assert!(parse_geometry("-400x800").is_err());
        assert!(parse_geometry("0x800").is_err());
        assert!(parse_geometry("fooxbar").is_err());
    }

    #[test]
    fn test_set_geometry_round_trip() {
        let mut settings = Settings::default();
        settings.set_geometry(1024, 768);
        assert_eq!(settings.geometry, "1024x768");
        assert_eq!(parse_geometry(&settings.geometry).unwrap(), (1024, 768));
    }
}
