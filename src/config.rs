//! Configuration file support.
//!
//! Render settings and log verbosity are read from a small versioned JSON
//! file so that the edge-highlighting mode and mask opacities can be changed
//! without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INTERIOR_ALPHA, DEFAULT_OUTLINE_ALPHA, EDGE_RENDERING_DEFAULT};
use crate::error::ConfigError;

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
    /// Filter handed to the logger.
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

/// How mask pixels are turned into colours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Opacity of ordinary mask pixels (0.0-1.0)
    #[serde(default = "default_interior_alpha")]
    pub interior_alpha: f32,

    /// Opacity of edge pixels (0.0-1.0), used only with `edge_rendering`
    #[serde(default = "default_outline_alpha")]
    pub outline_alpha: f32,

    /// Draw segment edges with `outline_alpha`
    #[serde(default = "default_edge_rendering")]
    pub edge_rendering: bool,
}

fn default_interior_alpha() -> f32 {
    DEFAULT_INTERIOR_ALPHA
}

fn default_outline_alpha() -> f32 {
    DEFAULT_OUTLINE_ALPHA
}

fn default_edge_rendering() -> bool {
    EDGE_RENDERING_DEFAULT
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            interior_alpha: default_interior_alpha(),
            outline_alpha: default_outline_alpha(),
            edge_rendering: default_edge_rendering(),
        }
    }
}

impl RenderSettings {
    /// Enable or disable edge highlighting.
    pub fn with_edge_rendering(mut self, enabled: bool) -> Self {
        self.edge_rendering = enabled;
        self
    }
}

/// Engine configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Mask rendering settings
    #[serde(default)]
    pub render: RenderSettings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl MaskConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            render: RenderSettings::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
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

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self::new()
    }
}
