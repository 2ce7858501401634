//! Resource usage states and transition tracking.
//!
//! Every GPU buffer or image has a current usage state that must match the
//! state the next operation expects; changing it requires an explicit
//! barrier. The native API does not validate this at all; a wrong
//! `before` state is undefined behavior. [`TrackedState`] closes that gap
//! in debug builds: a transition whose declared `before` does not match the
//! last recorded state is reported as an error. Release builds skip the
//! check and simply record the new state, preserving the native cost model.

#[cfg(debug_assertions)]
use crate::core::error::GraphicsError;
use crate::core::error::Result;

/// Usage states relevant to this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Destination of a copy operation.
    CopyDest,
    /// Host-writable upload heap state.
    GenericRead,
    /// Bound as a vertex buffer.
    VertexBuffer,
    /// Bound as a render target.
    RenderTarget,
    /// Ready for presentation.
    Present,
}

/// Shadow copy of one resource's current usage state.
#[derive(Debug)]
pub struct TrackedState {
    current: ResourceState,
}

impl TrackedState {
    /// Starts tracking a resource created in `initial`.
    pub fn new(initial: ResourceState) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> ResourceState {
        self.current
    }

    /// Records a transition barrier. In debug builds a `before` that does
    /// not match the last recorded state is an error; in release the new
    /// state is recorded unconditionally.
    pub fn transition(&mut self, before: ResourceState, after: ResourceState) -> Result<()> {
        #[cfg(debug_assertions)]
        if before != self.current {
            return Err(GraphicsError::InvalidState(format!(
                "barrier declares {:?} but resource was last transitioned to {:?}",
                before, self.current
            ))
            .into());
        }
        #[cfg(not(debug_assertions))]
        let _ = before;

        self.current = after;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_the_upload_protocol() {
        let mut state = TrackedState::new(ResourceState::CopyDest);
        state
            .transition(ResourceState::CopyDest, ResourceState::VertexBuffer)
            .unwrap();
        assert_eq!(state.current(), ResourceState::VertexBuffer);
    }

    #[test]
    fn transitions_follow_the_frame_protocol() {
        let mut state = TrackedState::new(ResourceState::Present);
        for _ in 0..3 {
            state
                .transition(ResourceState::Present, ResourceState::RenderTarget)
                .unwrap();
            state
                .transition(ResourceState::RenderTarget, ResourceState::Present)
                .unwrap();
        }
        assert_eq!(state.current(), ResourceState::Present);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn mismatched_before_state_is_reported() {
        let mut state = TrackedState::new(ResourceState::Present);
        let err = state
            .transition(ResourceState::RenderTarget, ResourceState::Present)
            .unwrap_err();
        assert!(err.to_string().contains("last transitioned"));
        // The bad barrier must not be recorded.
        assert_eq!(state.current(), ResourceState::Present);
    }
}
