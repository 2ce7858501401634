//! Ambient support modules, independent of any graphics API.
//!
//! - `config`: TOML-backed settings with fixed defaults
//! - `log`: structured logging via `tracing`
//! - `error`: unified error types

pub mod config;
pub mod error;
pub mod log;

pub use config::Config;
pub use error::{FrameLoopError, Result};
