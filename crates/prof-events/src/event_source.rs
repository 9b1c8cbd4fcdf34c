//! The strategy contract every sampling technique implements.
//!
//! There are many ways to decide when a profiler should sample: regular
//! CPU-time intervals (setitimer), regular wall-clock intervals, hardware
//! performance counters, or user-defined events. The host profiler does
//! the *what* (capturing and recording a stack sample); an [`EventSource`]
//! says *when*. The host selects one strategy, arms a handler for the
//! signal it declares, and drives its lifecycle through the hooks below.
//!
//! Methods on this trait are intended to be called only by the host
//! profiler; calling them directly from application code can produce
//! unexpected behaviour.

use nix::sys::signal::Signal;
use prof_common::error::ProfResult;

/// A pluggable source of sampling events.
///
/// Implementations must be safe to share across threads: registration and
/// the tick query run on application threads while the host mutates the
/// callback set from its own.
pub trait EventSource: Send + Sync {
    /// Register the current thread with the event source.
    ///
    /// Called once per application thread, at thread start or on explicit
    /// registration by the host. Any per-thread setup happens here (for a
    /// shared-timer strategy, insertion into its delivery registry). Must
    /// be safe to call concurrently with event delivery. Registration is
    /// not idempotent; the host registers each thread exactly once.
    fn register_thread(&self, callback_count: usize);

    /// Notification that the host's callback set grew to `new_callback_count`.
    ///
    /// A shared-timer strategy starts producing events on the 0 -> 1
    /// transition; transitions strictly between 1 and N are no-ops.
    fn registered_callback(&self, new_callback_count: usize);

    /// Notification that the host's callback set shrank to `new_callback_count`.
    ///
    /// A shared-timer strategy stops producing events on the 1 -> 0
    /// transition.
    fn unregistered_callback(&self, new_callback_count: usize);

    /// Return the strategy to its pre-start state, stopping any background
    /// activity. Must be callable even if the strategy never started.
    fn reset(&self);

    /// The signal the host must arm a handler for, or `None` if this
    /// strategy never raises one (a poll-based strategy, say).
    fn signal(&self) -> Option<Signal> {
        None
    }

    /// Best-effort, low-cost resumption of event delivery.
    ///
    /// The host pairs these with arming/disarming its own signal handler
    /// while it mutates internal state, so a strategy may implement them
    /// as a plain flag check rather than fully stopping its source. A few
    /// already-in-flight events may still be delivered after
    /// [`disable_events`](Self::disable_events); that is acceptable.
    fn enable_events(&self) {}

    /// Best-effort, low-cost suppression of event delivery.
    fn disable_events(&self) {}

    /// How many units of this strategy's clock elapsed since the calling
    /// thread last asked, atomically resetting that thread's bookkeeping.
    ///
    /// Invoked by the host's signal handler, on the thread that received
    /// the event, exactly once per handler invocation; the returned count
    /// weights the sample. Implementations must be safe in
    /// delivered-signal context: no locks, no allocation, no I/O. A
    /// coalescing strategy returns more than 1 when deliveries were
    /// missed, e.g. while the thread was blocked in a syscall; the naive
    /// default is one event, one unit.
    fn ticks_since_last_call(&self) -> u32 {
        1
    }
}

/// Callback through which the host records one captured sample.
///
/// `count` is the statistical weight of the sample (the tick delta
/// reported by the strategy) and `frames` the captured return addresses,
/// innermost first.
pub type RecordCallback = fn(count: u32, frames: &[usize]);

/// Factory signature under which the host constructs a strategy by
/// frequency and an opaque, strategy-specific spec string.
///
/// The mechanism that locates a factory by name at runtime belongs to the
/// host; strategies only have to expose a conforming constructor.
pub type SourceFactoryFn = fn(
    frequency: u32,
    spec: &str,
    record: RecordCallback,
) -> ProfResult<Box<dyn EventSource>>;
