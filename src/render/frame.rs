//! Per-frame command recording state machine.
//!
//! A frame moves through `Idle → Recording → Submitted → Presenting → Idle`,
//! one full cycle per presented image. The command allocator backing the
//! recording may only be reset in `Idle`, which the renderer reaches via a
//! fence wait; that wait is what makes the reset safe against the GPU still
//! reading the previous batch. Driving the machine out of order is a
//! programming error and is rejected rather than allowed to corrupt the
//! in-flight command buffer.

use crate::core::error::{GraphicsError, Result};

/// Phases of one frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// No recording in progress; allocator reset is permitted.
    Idle,
    /// Commands are being recorded into the command list.
    Recording,
    /// The closed command list has been handed to the queue.
    Submitted,
    /// The surface was asked to present; awaiting the fence.
    Presenting,
}

/// Tracks the current phase and the current back-buffer index.
#[derive(Debug)]
pub struct FrameCycle {
    phase: FramePhase,
    back_buffer: usize,
    frames_presented: u64,
}

impl FrameCycle {
    /// Starts in `Idle`, targeting the given back buffer.
    pub fn new(back_buffer: usize) -> Self {
        Self {
            phase: FramePhase::Idle,
            back_buffer,
            frames_presented: 0,
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Index of the swap-chain image the current cycle targets. Always 0
    /// or 1 for a double-buffered surface.
    pub fn back_buffer(&self) -> usize {
        self.back_buffer
    }

    /// Number of completed cycles.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// `Idle → Recording`. Only valid once the previous cycle fully
    /// completed; rejects re-entry instead of clobbering in-flight work.
    pub fn begin_recording(&mut self) -> Result<()> {
        self.expect(FramePhase::Idle, "begin_recording")?;
        self.phase = FramePhase::Recording;
        Ok(())
    }

    /// `Recording → Submitted`: the closed command list was handed to the
    /// queue for execution.
    pub fn submit(&mut self) -> Result<()> {
        self.expect(FramePhase::Recording, "submit")?;
        self.phase = FramePhase::Submitted;
        Ok(())
    }

    /// `Submitted → Presenting`: the surface was asked to present.
    pub fn present(&mut self) -> Result<()> {
        self.expect(FramePhase::Submitted, "present")?;
        self.phase = FramePhase::Presenting;
        Ok(())
    }

    /// `Presenting → Idle`: the fence wait finished; `next_back_buffer` is
    /// the re-queried current index for the next cycle.
    pub fn complete(&mut self, next_back_buffer: usize) -> Result<()> {
        self.expect(FramePhase::Presenting, "complete")?;
        debug_assert!(next_back_buffer < 2, "back-buffer index out of range");
        self.phase = FramePhase::Idle;
        self.back_buffer = next_back_buffer;
        self.frames_presented += 1;
        Ok(())
    }

    fn expect(&self, wanted: FramePhase, op: &str) -> Result<()> {
        if self.phase != wanted {
            return Err(GraphicsError::InvalidState(format!(
                "{} requires {:?}, frame is {:?}",
                op, wanted, self.phase
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_in_order() {
        let mut cycle = FrameCycle::new(0);
        assert_eq!(cycle.phase(), FramePhase::Idle);

        cycle.begin_recording().unwrap();
        assert_eq!(cycle.phase(), FramePhase::Recording);
        cycle.submit().unwrap();
        cycle.present().unwrap();
        cycle.complete(1).unwrap();

        assert_eq!(cycle.phase(), FramePhase::Idle);
        assert_eq!(cycle.back_buffer(), 1);
        assert_eq!(cycle.frames_presented(), 1);
    }

    #[test]
    fn reentrant_begin_recording_is_rejected() {
        let mut cycle = FrameCycle::new(0);
        cycle.begin_recording().unwrap();

        // The allocator is still bound to the open recording; a second
        // begin must fail rather than silently reset it.
        assert!(cycle.begin_recording().is_err());
        assert_eq!(cycle.phase(), FramePhase::Recording);
    }

    #[test]
    fn begin_before_complete_is_rejected_in_every_phase() {
        let mut cycle = FrameCycle::new(0);
        cycle.begin_recording().unwrap();
        cycle.submit().unwrap();
        assert!(cycle.begin_recording().is_err());
        cycle.present().unwrap();
        assert!(cycle.begin_recording().is_err());
        cycle.complete(0).unwrap();
        assert!(cycle.begin_recording().is_ok());
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut cycle = FrameCycle::new(0);
        assert!(cycle.submit().is_err());
        assert!(cycle.present().is_err());
        assert!(cycle.complete(0).is_err());

        cycle.begin_recording().unwrap();
        assert!(cycle.present().is_err());
        assert!(cycle.complete(0).is_err());
    }

    #[test]
    fn back_buffer_alternates_and_stays_in_domain() {
        let mut cycle = FrameCycle::new(0);
        for frame in 0..8u64 {
            cycle.begin_recording().unwrap();
            cycle.submit().unwrap();
            cycle.present().unwrap();
            let next = (cycle.back_buffer() + 1) % 2;
            cycle.complete(next).unwrap();
            assert!(cycle.back_buffer() < 2);
            assert_eq!(cycle.frames_presented(), frame + 1);
        }
    }
}
