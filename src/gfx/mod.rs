//! Direct3D 12 backend.
//!
//! - `context`: device, queue, swap chain, RTV heap
//! - `sync`: fence + OS event wait
//! - `upload`: synchronous staging-buffer upload
//! - `pipeline`: shader compilation and PSO assembly
//! - `renderer`: the per-frame record/submit/present cycle

pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod sync;
pub mod upload;

pub use context::Dx12Context;
pub use renderer::Renderer;
