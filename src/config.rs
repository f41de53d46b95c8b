//! Viewer configuration.
//!
//! Zoom behavior, overlay style and display preferences, stored as versioned
//! JSON. Every field has a default, so partial files load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::{RenderOptions, RenderStyle};
use crate::viewport::ZoomSettings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Log verbosity level
    pub log_level: LogLevel,
    pub show_labels: bool,
    pub show_key_points: bool,
    /// Font used for label text; a system font is tried when unset
    pub font_path: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            show_labels: true,
            show_key_points: true,
            font_path: None,
        }
    }
}

impl Preferences {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_labels: self.show_labels,
            show_key_points: self.show_key_points,
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    pub version: u32,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub zoom: ZoomSettings,
    #[serde(default)]
    pub style: RenderStyle,
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            zoom: ZoomSettings::default(),
            style: RenderStyle::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON, rejecting newer file versions.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "planview-config.json"
    }

    /// Default config file location, under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("planview").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("planview")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load from an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer_constants() {
        let config = ViewerConfig::default();
        assert_eq!(config.zoom.max_zoom, 5.0);
        assert_eq!(config.zoom.double_click_factor, 1.35);
        assert_eq!(config.style.label_height, 28.0);
        assert_eq!(config.style.fill_alpha, 0.25);
        assert!(config.preferences.show_labels);
        assert_eq!(config.preferences.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = ViewerConfig::default();
        config.preferences.log_level = LogLevel::Debug;
        config.preferences.show_key_points = false;
        config.zoom.smoothing = 0.1;
        config.style.font_size = 20.0;

        let json = config.to_json().unwrap();
        assert_eq!(ViewerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{"version": 1, "zoom": {"max_zoom": 8.0}, "preferences": {"log_level": "warn"}}"#;
        let config = ViewerConfig::from_json(json).unwrap();
        assert_eq!(config.zoom.max_zoom, 8.0);
        assert_eq!(config.zoom.zoom_in_factor, 1.1);
        assert_eq!(config.preferences.log_level, LogLevel::Warn);
        assert!(config.preferences.show_labels);
        assert_eq!(config.style, RenderStyle::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{"version": 99}"#;
        let err = ViewerConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            ViewerConfig::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = std::env::temp_dir().join(format!("planview-config-test-{}", std::process::id()));
        let path = dir.join("nested").join(ViewerConfig::default_filename());
        let mut config = ViewerConfig::default();
        config.preferences.show_labels = false;

        config.save_to_path(&path).unwrap();
        let loaded = ViewerConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_level_filter_mapping() {
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    }
}
