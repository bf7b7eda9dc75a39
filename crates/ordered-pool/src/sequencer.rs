//! Ticket gate that admits finalize steps in submission order.
//!
//! The gate holds a single cursor: the sequence number allowed to finalize
//! next. A job waits until the cursor equals its own sequence, runs its
//! finalize step while holding the gate, and releases the gate by advancing
//! the cursor. A job is only ever blocked by the job whose sequence equals the
//! cursor, so once every earlier job has finalized the wait ends.

use parking_lot::{Condvar, Mutex, MutexGuard};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub(crate) struct TicketSequencer {
    #[cfg(feature = "cache-padded")]
    cursor: crossbeam_utils::CachePadded<Mutex<u64>>,
    #[cfg(not(feature = "cache-padded"))]
    cursor: Mutex<u64>,
    turn: Condvar,
}

/// Exclusive right to finalize one sequence number.
///
/// Dropping the ticket advances the cursor by one and wakes every waiter,
/// including when the holder is unwinding.
#[must_use = "dropping a ticket immediately releases the gate"]
pub(crate) struct Ticket<'a> {
    cursor: MutexGuard<'a, u64>,
    turn: &'a Condvar,
}

impl TicketSequencer {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            cursor: crossbeam_utils::CachePadded::new(Mutex::new(0)),
            #[cfg(not(feature = "cache-padded"))]
            cursor: Mutex::new(0),
            turn: Condvar::new(),
        }
    }

    /// Blocks until `sequence` is next in line, then returns its ticket.
    ///
    /// Waiting for a sequence that was never issued, or that already
    /// finalized, blocks forever.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub(crate) fn admit(&self, sequence: u64) -> Ticket<'_> {
        let mut cursor = self.cursor.lock();
        debug_assert!(*cursor <= sequence, "sequence {sequence} already finalized");
        self.turn.wait_while(&mut cursor, |cursor| *cursor != sequence);
        Ticket {
            cursor,
            turn: &self.turn,
        }
    }

    /// Blocks until every sequence below `target` has finalized, without
    /// taking a ticket.
    pub(crate) fn wait_until(&self, target: u64) {
        let mut cursor = self.cursor.lock();
        self.turn.wait_while(&mut cursor, |cursor| *cursor < target);
    }

    /// The next sequence number allowed to finalize.
    #[cfg(test)]
    pub(crate) fn cursor(&self) -> u64 {
        *self.cursor.lock()
    }
}

impl Ticket<'_> {
    pub(crate) fn sequence(&self) -> u64 {
        *self.cursor
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        *self.cursor += 1;
        self.turn.notify_all();
    }
}
