//! CPU side of the fence synchronization protocol.
//!
//! A fence is a monotonically increasing 64-bit counter the GPU advances as
//! it retires submitted work. The CPU issues a [`Ticket`] per signal request
//! and later blocks until the fence's completed value reaches that ticket.
//! This module tracks the counter itself; the OS wait primitive lives in
//! `gfx::sync`, which pairs a [`TicketCounter`] with a real `ID3D12Fence`.
//!
//! Invariants:
//! - tickets are issued as exactly 1, 2, 3, ...: strictly increasing by one,
//!   no gaps, no duplicates;
//! - the observed completed value is non-decreasing and never exceeds the
//!   highest ticket ever issued.

use std::sync::atomic::{AtomicU64, Ordering};

/// A fence value handed out by [`TicketCounter::issue`].
///
/// Waiting on a ticket that was never issued is not reachable through the
/// public API; if it were, the wait would block indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issue/retire bookkeeping for one fence.
///
/// The counter starts at zero; the first issued ticket is 1, matching the
/// initial value the GPU fence is created with.
#[derive(Debug)]
pub struct TicketCounter {
    issued: AtomicU64,
    completed: AtomicU64,
}

impl TicketCounter {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Reserves and returns the next ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Highest ticket issued so far.
    pub fn last_issued(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }

    /// Highest fence value known to be retired by the GPU.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Records a completed value observed from the GPU fence.
    ///
    /// The completed value never moves backwards even if observations
    /// arrive out of order.
    pub fn observe_completed(&self, value: u64) {
        self.completed.fetch_max(value, Ordering::AcqRel);
    }

    /// Whether the work guarded by `ticket` has retired.
    pub fn is_completed(&self, ticket: Ticket) -> bool {
        self.completed() >= ticket.value()
    }
}

impl Default for TicketCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_increase_by_one_from_one() {
        let counter = TicketCounter::new();
        for expected in 1..=100u64 {
            assert_eq!(counter.issue().value(), expected);
        }
        assert_eq!(counter.last_issued(), 100);
    }

    #[test]
    fn completed_value_is_monotonic() {
        let counter = TicketCounter::new();
        let t1 = counter.issue();
        let t2 = counter.issue();

        counter.observe_completed(t2.value());
        assert!(counter.is_completed(t1));
        assert!(counter.is_completed(t2));

        // A stale observation must not move the value backwards.
        counter.observe_completed(t1.value());
        assert_eq!(counter.completed(), t2.value());
    }

    #[test]
    fn unretired_ticket_is_not_completed() {
        let counter = TicketCounter::new();
        let t1 = counter.issue();
        let t2 = counter.issue();

        counter.observe_completed(t1.value());
        assert!(counter.is_completed(t1));
        assert!(!counter.is_completed(t2));
    }

    #[test]
    fn ticket_ordering_follows_issue_order() {
        let counter = TicketCounter::new();
        let a = counter.issue();
        let b = counter.issue();
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn issue_is_race_free_across_threads() {
        use std::sync::Arc;

        let counter = Arc::new(TicketCounter::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                (0..250).map(|_| counter.issue().value()).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(all[0], 1);
        assert_eq!(*all.last().unwrap(), 1000);
    }
}
