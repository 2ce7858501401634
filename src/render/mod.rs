//! Rendering protocol logic that is independent of the graphics API.
//!
//! These modules express the invariants the Direct3D 12 backend in `gfx`
//! relies on (fence ticket monotonicity, the per-frame state machine,
//! resource-state transitions, descriptor offset math, and the vertex
//! layout) in plain Rust so they can be unit-tested without a GPU.

pub mod descriptor;
pub mod frame;
pub mod state;
pub mod sync;
pub mod vertex;

pub use frame::{FrameCycle, FramePhase};
pub use state::{ResourceState, TrackedState};
pub use sync::{Ticket, TicketCounter};
pub use vertex::Vertex;
