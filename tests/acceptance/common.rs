//! Common utilities for the acceptance tests.
//!
//! Provides the host-profiler side of the contract: an armed SIGPROF
//! handler that queries the tick delta (as a real profiler would weight a
//! sample), plus counters the tests read back afterwards.

#![allow(dead_code)] // Not every helper is used by every test module.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

/// Sum of tick weights consumed by the handler, across all threads.
static TOTAL_TICKS: AtomicU32 = AtomicU32::new(0);

thread_local! {
    /// SIGPROF deliveries observed by this thread.
    static SIGNAL_HITS: Cell<u32> = const { Cell::new(0) };
}

/// Serialize tests that drive the process-wide tick clock.
pub fn test_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initialize test logging once; respects `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The host profiler's signal handler: count the delivery and consume the
/// tick delta for this thread. Atomics and thread-local cell access only.
extern "C" fn on_profiling_signal(_signum: libc::c_int) {
    SIGNAL_HITS.with(|hits| hits.set(hits.get() + 1));
    let weight = prof_events::tick::ticks_since_last_call();
    TOTAL_TICKS.fetch_add(weight, Ordering::Relaxed);
}

/// Arm the SIGPROF handler, once per process.
///
/// SA_RESTART keeps interrupted syscalls (the workers' sleeps) going.
pub fn install_profiling_handler() {
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let action = SigAction::new(
            SigHandler::Handler(on_profiling_signal),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler touches only atomics and const-initialized
        // thread-local cells.
        unsafe {
            sigaction(Signal::SIGPROF, &action).expect("arming SIGPROF handler");
        }
    });
}

/// SIGPROF deliveries observed by the calling thread.
pub fn thread_signal_hits() -> u32 {
    SIGNAL_HITS.with(Cell::get)
}

/// Clear the calling thread's delivery count.
pub fn reset_thread_hits() {
    SIGNAL_HITS.with(|hits| hits.set(0));
}

/// Sum of tick weights the handler has consumed, process-wide.
pub fn total_ticks() -> u32 {
    TOTAL_TICKS.load(Ordering::Relaxed)
}

/// Reset the process-wide tick-weight counter.
pub fn reset_total_ticks() {
    TOTAL_TICKS.store(0, Ordering::Relaxed);
}
