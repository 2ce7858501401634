//! Configuration loading and validation.
//!
//! Settings are read from a TOML file when one is present and fall back to
//! built-in defaults otherwise. The defaults reproduce the fixed
//! presentation parameters of this core: a 1280×720 non-resizable window,
//! two back buffers, vertical sync on.
//!
//! # File format (frameloop.toml)
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//! title = "frameloop"
//!
//! [graphics]
//! vsync = true
//! clear_color = [0.0, 0.2, 0.4, 1.0]
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// Number of swap-chain back buffers. Fixed; the render loop's state
/// machine and RTV heap are sized for exactly two images.
pub const BUFFER_COUNT: u32 = 2;

/// Complete runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Window settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Graphics settings.
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_title")]
    pub title: String,
}

/// Graphics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// Present with sync interval 1 (tear-free) when true, 0 otherwise.
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// RGBA clear color applied to the render target each frame.
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default)]
    pub file_output: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_title() -> String {
    "frameloop".to_string()
}
fn default_vsync() -> bool {
    true
}
fn default_clear_color() -> [f32; 4] {
    [0.0, 0.2, 0.4, 1.0]
}
fn default_log_level() -> LogLevel {
    LogLevel::Info
}
fn default_log_file() -> String {
    "frameloop.log".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics: GraphicsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            clear_color: default_clear_color(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Loads configuration from a TOML file, falling back to the built-in
    /// defaults when the file is missing or malformed.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// Checks that the loaded values describe a usable surface.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        for (i, c) in self.graphics.clear_color.iter().enumerate() {
            if !(0.0..=1.0).contains(c) {
                return Err(ConfigError::InvalidValue {
                    field: format!("graphics.clear_color[{}]", i),
                    reason: "Components must be in [0.0, 1.0]".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Present interval handed to the swap chain: 1 when vsync is on.
    pub fn sync_interval(&self) -> u32 {
        if self.graphics.vsync {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_presentation_parameters() {
        let config = Config::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(config.graphics.vsync);
        assert_eq!(config.sync_interval(), 1);
        assert_eq!(config.graphics.clear_color, [0.0, 0.2, 0.4, 1.0]);
        assert_eq!(BUFFER_COUNT, 2);
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_clear_color_is_rejected() {
        let mut config = Config::default();
        config.graphics.clear_color = [0.0, 0.2, 1.5, 1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [graphics]
            vsync = false
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.sync_interval(), 0);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
