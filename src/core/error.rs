//! Unified error types for the frame loop.
//!
//! Every fallible operation in the crate returns [`Result`]. There are two
//! broad families: configuration problems detected before the device exists,
//! and graphics failures, all of which are fatal for this minimal core:
//! `main` reports them and exits. No retry or degraded mode exists.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FrameLoopError>;

/// Top-level error type.
#[derive(Debug)]
pub enum FrameLoopError {
    /// Configuration loading or validation failure.
    Config(ConfigError),

    /// Graphics API failure (device, swap chain, shaders, resources).
    Graphics(GraphicsError),

    /// IO failure.
    Io(std::io::Error),

    /// Initialization failure outside the graphics API (event loop, window).
    Initialization(String),
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    FileNotFound(String),

    /// Config file could not be parsed.
    ParseError(String),

    /// A value was present but invalid.
    InvalidValue { field: String, reason: String },
}

/// Graphics API errors. All of these are fatal for this core.
#[derive(Debug)]
pub enum GraphicsError {
    /// Adapter or device creation failed.
    DeviceCreation(String),

    /// Swap chain creation or presentation failed.
    Swapchain(String),

    /// Shader compilation failed; carries the compiler diagnostic text.
    ShaderCompilation(String),

    /// Buffer, heap, fence, or pipeline creation failed.
    ResourceCreation(String),

    /// Command recording or submission failed.
    CommandExecution(String),

    /// A resource's declared usage state did not match its last recorded
    /// transition, or the frame state machine was driven out of order.
    InvalidState(String),
}

impl fmt::Display for FrameLoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameLoopError::Config(e) => write!(f, "Configuration error: {}", e),
            FrameLoopError::Graphics(e) => write!(f, "Graphics error: {}", e),
            FrameLoopError::Io(e) => write!(f, "IO error: {}", e),
            FrameLoopError::Initialization(msg) => write!(f, "Initialization error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::Swapchain(msg) => write!(f, "Swap chain error: {}", msg),
            GraphicsError::ShaderCompilation(msg) => {
                write!(f, "Shader compilation failed: {}", msg)
            }
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            GraphicsError::CommandExecution(msg) => write!(f, "Command execution failed: {}", msg),
            GraphicsError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for FrameLoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameLoopError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

impl From<std::io::Error> for FrameLoopError {
    fn from(err: std::io::Error) -> Self {
        FrameLoopError::Io(err)
    }
}

impl From<ConfigError> for FrameLoopError {
    fn from(err: ConfigError) -> Self {
        FrameLoopError::Config(err)
    }
}

impl From<GraphicsError> for FrameLoopError {
    fn from(err: GraphicsError) -> Self {
        FrameLoopError::Graphics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_error_display_carries_diagnostic() {
        let err = FrameLoopError::from(GraphicsError::ShaderCompilation(
            "error X3004: undeclared identifier 'colr'".to_string(),
        ));
        let text = err.to_string();
        assert!(text.contains("Shader compilation failed"));
        assert!(text.contains("X3004"));
    }

    #[test]
    fn io_error_is_chained_as_source() {
        let err = FrameLoopError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert!(std::error::Error::source(&err).is_some());
    }
}
