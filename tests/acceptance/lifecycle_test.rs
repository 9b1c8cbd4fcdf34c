//! Driver lifecycle through the host-facing trait object.

use super::common;
use nix::sys::signal::Signal;
use prof_common::ProfError;
use prof_events::{EventSource, SourceFactoryFn, WallClockEventSource};

fn record_sample(_count: u32, _frames: &[usize]) {}

/// The host constructs strategies through the factory signature.
#[test]
fn factory_builds_a_wallclock_source() {
    let factory: SourceFactoryFn = WallClockEventSource::build;

    let source = factory(100, "", record_sample).unwrap();
    assert_eq!(source.signal(), Some(Signal::SIGPROF));

    let err = factory(0, "", record_sample).map(|_| ()).unwrap_err();
    assert!(matches!(err, ProfError::Config(_)));
}

/// A full stop (callback count back to zero) leaves the strategy
/// restartable, repeatedly.
#[test]
fn restart_after_full_stop() {
    let _lock = common::test_lock();
    common::init_tracing();

    let source: Box<dyn EventSource> =
        Box::new(WallClockEventSource::with_frequency(1000).unwrap());

    for _ in 0..3 {
        source.registered_callback(1);
        source.unregistered_callback(0);
    }
}

/// Reset is callable before the strategy ever started, and mid-run it
/// stops the driver without losing the configuration or the registry.
#[test]
fn reset_is_safe_in_any_state() {
    let _lock = common::test_lock();
    common::init_tracing();

    let source = WallClockEventSource::with_frequency(1000).unwrap();
    source.reset(); // never started

    source.register_thread(1);
    source.registered_callback(1);
    source.reset();
    assert!(!source.driver_running());
    assert_eq!(source.registered_threads(), 1);

    // Restart after reset, as after a normal stop.
    source.registered_callback(1);
    assert!(source.driver_running());
    source.unregistered_callback(0);
}

/// Stopping a never-started driver returns normally.
#[test]
fn stop_without_start_returns_normally() {
    let source: Box<dyn EventSource> =
        Box::new(WallClockEventSource::with_frequency(100).unwrap());
    source.unregistered_callback(0);
    source.reset();
}
