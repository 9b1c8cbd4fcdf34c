#![doc = "Sampling event sources: when a statistical profiler takes a sample."]
//!
//! A sampling profiler separates the *when* (this crate) from the *what*
//! (the host profiler, which owns the signal handler and records stack
//! samples). An [`EventSource`] is a strategy deciding when a sample is
//! triggered; [`WallClockEventSource`] triggers on regular intervals of
//! real elapsed time, so that I/O-bound and blocked execution shows up in
//! the profile instead of only consumed CPU time.

pub mod event_source;
pub mod realtime;
pub mod registry;
pub mod tick;
pub mod wall_clock;

pub use event_source::{EventSource, RecordCallback, SourceFactoryFn};
pub use registry::ThreadRegistry;
pub use wall_clock::WallClockEventSource;
