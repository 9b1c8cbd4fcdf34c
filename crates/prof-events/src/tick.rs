//! The process-wide tick clock and per-thread tick cursors.
//!
//! The clock driver advances [`advance`] exactly once per wall-clock
//! period, making the counter the single source of truth for "how many
//! periods have passed" in this process. Every other access is an atomic
//! read. Each application thread keeps a private cursor recording the
//! clock value as of its last query, so the per-sample hot path needs no
//! synchronization at all.
//!
//! [`ticks_since_last_call`] is designed to run inside delivered-signal
//! context: a plain atomic load plus const-initialized thread-local cell
//! access, with no locks, no allocation, and no I/O.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

/// Periods elapsed since process start, modulo `u32` wrap.
///
/// Single writer (the clock driver); wraparound is benign and handled by
/// the wrapping subtraction in [`ticks_since_last_call`].
static CURRENT_TICK: AtomicU32 = AtomicU32::new(0);

thread_local! {
    /// This thread's view of the clock as of its last query.
    /// `None` until the thread asks for the first time.
    static LAST_TICK: Cell<Option<u32>> = const { Cell::new(None) };
}

/// Advance the clock by one period. Called only by the clock driver.
pub(crate) fn advance() {
    CURRENT_TICK.fetch_add(1, Ordering::AcqRel);
}

/// Current clock value.
#[must_use]
pub fn current() -> u32 {
    CURRENT_TICK.load(Ordering::Acquire)
}

/// Periods elapsed since the calling thread last asked, updating the
/// thread's cursor to now.
///
/// The very first call on a thread returns 1 regardless of the clock
/// value: the thread has no baseline yet, and undercounting one bootstrap
/// sample is accepted noise. Afterwards the count is
/// `current.wrapping_sub(cursor)` - both values are unsigned readings of
/// the same monotonically increasing counter, so the wrapping difference
/// is the elapsed-period count even across `u32` overflow.
///
/// Safe to call from signal-handler context.
#[must_use]
pub fn ticks_since_last_call() -> u32 {
    let system = CURRENT_TICK.load(Ordering::Acquire);
    LAST_TICK.with(|cursor| {
        let ticks = match cursor.get() {
            Some(mine) => system.wrapping_sub(mine),
            // First query on this thread: no baseline to diff against.
            None => 1,
        };
        cursor.set(Some(system));
        ticks
    })
}
