//! Fence synchronization: the GPU half of the ticket protocol.
//!
//! [`FrameFence`] pairs an `ID3D12Fence` with an auto-reset OS event and a
//! [`TicketCounter`]. `signal` asks the queue to advance the fence to the
//! next ticket once all prior submissions retire; `wait` blocks the calling
//! thread until the fence reaches a ticket. The wait carries no timeout, so
//! a hung GPU blocks the process indefinitely; an accepted limitation of
//! this core.

use tracing::trace;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Graphics::Direct3D12::{ID3D12CommandQueue, ID3D12Device, ID3D12Fence, D3D12_FENCE_FLAG_NONE};
use windows::Win32::System::Threading::{CreateEventA, WaitForSingleObject, INFINITE};

use crate::core::error::{GraphicsError, Result};
use crate::render::sync::{Ticket, TicketCounter};

/// A fence, its wait event, and the CPU-side ticket bookkeeping.
pub struct FrameFence {
    fence: ID3D12Fence,
    event: HANDLE,
    tickets: TicketCounter,
}

impl FrameFence {
    /// Creates the fence at value 0 and its auto-reset wait event.
    /// Creation failure is fatal.
    pub fn new(device: &ID3D12Device) -> Result<Self> {
        unsafe {
            let fence: ID3D12Fence = device
                .CreateFence(0, D3D12_FENCE_FLAG_NONE)
                .map_err(|e| GraphicsError::ResourceCreation(format!("fence: {:?}", e)))?;

            let event = CreateEventA(None, false, false, None)
                .map_err(|e| GraphicsError::ResourceCreation(format!("fence event: {:?}", e)))?;

            Ok(Self {
                fence,
                event,
                tickets: TicketCounter::new(),
            })
        }
    }

    /// Submits a signal request for the next ticket and returns it.
    pub fn signal(&self, queue: &ID3D12CommandQueue) -> Result<Ticket> {
        let ticket = self.tickets.issue();
        unsafe {
            queue
                .Signal(&self.fence, ticket.value())
                .map_err(|e| GraphicsError::CommandExecution(format!("fence signal: {:?}", e)))?;
        }
        trace!(ticket = ticket.value(), "Fence signal submitted");
        Ok(ticket)
    }

    /// Blocks until the fence's completed value reaches `ticket`.
    ///
    /// Every call site pairs this with a preceding [`signal`](Self::signal);
    /// waiting on a ticket that was never signaled would block forever.
    pub fn wait(&self, ticket: Ticket) -> Result<()> {
        unsafe {
            if self.fence.GetCompletedValue() < ticket.value() {
                self.fence
                    .SetEventOnCompletion(ticket.value(), self.event)
                    .map_err(|e| {
                        GraphicsError::CommandExecution(format!("fence wait setup: {:?}", e))
                    })?;
                WaitForSingleObject(self.event, INFINITE);
            }
            self.tickets.observe_completed(self.fence.GetCompletedValue());
        }
        trace!(ticket = ticket.value(), "Fence wait completed");
        Ok(())
    }

    /// One full CPU/GPU serialization point: signal, then wait for it.
    pub fn signal_and_wait(&self, queue: &ID3D12CommandQueue) -> Result<()> {
        let ticket = self.signal(queue)?;
        self.wait(ticket)
    }

    /// Highest ticket issued so far.
    pub fn last_issued(&self) -> u64 {
        self.tickets.last_issued()
    }
}

impl Drop for FrameFence {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.event);
        }
    }
}

// The fence and event handle are safe to move between threads; the single
// render thread is the only user in this core.
unsafe impl Send for FrameFence {}
