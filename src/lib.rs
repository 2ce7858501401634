//! frameloop: a minimal Direct3D 12 frame loop.
//!
//! The crate initializes a graphics device and a double-buffered
//! presentation surface, uploads a fixed triangle to GPU memory, builds a
//! shader pipeline, and then records, submits, and presents one command
//! buffer per frame, serialized against a fence.
//!
//! # Module structure
//!
//! - `core`: configuration, logging, error types
//! - `render`: GPU-independent protocol logic (fence tickets, the frame
//!   state machine, resource-state tracking, descriptor math, vertex
//!   layout), unit-tested on every platform
//! - `gfx`: the Direct3D 12 implementation (Windows only)

pub mod core;
pub mod render;

#[cfg(target_os = "windows")]
pub mod gfx;
