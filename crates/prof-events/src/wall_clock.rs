//! Wall-clock sampling: a clock driver thread fires events into all
//! registered threads at regular real-time intervals.
//!
//! CPU-time sampling under-represents I/O-bound programs: a thread
//! blocked in a syscall consumes no CPU and so never gets sampled. This
//! strategy instead runs a dedicated background thread that, once per
//! period, advances the process-wide tick clock and sends `SIGPROF` to
//! every registered thread, so samples are weighted by elapsed wall-clock
//! time. Signals coalesced while a thread could not receive them are
//! recovered through the tick delta reported by
//! [`ticks_since_last_call`](EventSource::ticks_since_last_call).

use crate::event_source::{EventSource, RecordCallback};
use crate::realtime::{self, DriverSched};
use crate::registry::ThreadRegistry;
use crate::tick;
use nix::sys::signal::Signal;
use prof_common::config::SamplerConfig;
use prof_common::error::ProfResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// The signal this strategy raises; the host arms its handler for it.
const PROFILING_SIGNAL: Signal = Signal::SIGPROF;

/// State shared between the event source and its driver thread.
#[derive(Debug, Default)]
struct DriverShared {
    /// Cooperative stop flag, checked once per period.
    stop: AtomicBool,
    /// Best-effort delivery suppression; intentionally just a relaxed
    /// flag, since the host gates its own handler around the same window.
    events_enabled: AtomicBool,
    /// Threads to fan the signal out to.
    registry: ThreadRegistry,
}

/// Event source sampling at regular wall-clock intervals.
///
/// The driver thread exists exactly while at least one sampling callback
/// is registered with the host (tracked through the callback-count
/// lifecycle hooks). Dropping the source stops the driver.
#[derive(Debug)]
pub struct WallClockEventSource {
    /// Driver sleep per tick; fixed at construction.
    period: Duration,
    shared: Arc<DriverShared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl WallClockEventSource {
    /// Build a source from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured frequency is out of range.
    pub fn new(config: &SamplerConfig) -> ProfResult<Self> {
        config.validate()?;
        Ok(Self {
            period: config.period(),
            shared: Arc::new(DriverShared::default()),
            driver: Mutex::new(None),
        })
    }

    /// Build a source sampling `frequency` times per second.
    ///
    /// # Errors
    ///
    /// Returns an error if `frequency` is out of range.
    pub fn with_frequency(frequency: u32) -> ProfResult<Self> {
        Self::new(&SamplerConfig { frequency })
    }

    /// Factory conforming to [`SourceFactoryFn`](crate::SourceFactoryFn).
    ///
    /// The spec string and record callback are unused by this strategy:
    /// it takes no extra configuration, and recording is owned by the
    /// host's signal handler.
    ///
    /// # Errors
    ///
    /// Returns an error if `frequency` is out of range.
    pub fn build(
        frequency: u32,
        _spec: &str,
        _record: RecordCallback,
    ) -> ProfResult<Box<dyn EventSource>> {
        Ok(Box::new(Self::with_frequency(frequency)?))
    }

    /// Whether the clock driver thread is currently running.
    #[must_use]
    pub fn driver_running(&self) -> bool {
        self.driver_slot().is_some()
    }

    /// Whether delivery is currently enabled.
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.shared.events_enabled.load(Ordering::Relaxed)
    }

    /// Number of live thread handles in the registry.
    #[must_use]
    pub fn registered_threads(&self) -> usize {
        self.shared.registry.len()
    }

    /// Start the clock driver thread.
    ///
    /// # Panics
    ///
    /// Panics if a driver is already running (host double-start, not
    /// locally recoverable), if the platform scheduler query fails, or if
    /// the thread cannot be spawned.
    fn start_driver(&self) {
        let mut slot = self.driver_slot();
        if slot.is_some() {
            error!("clock driver already running");
            panic!("clock driver already running");
        }

        // Query on the starting thread: failure here is a lifecycle-
        // boundary fatal, unlike denied elevation inside the driver.
        let sched = match realtime::query_max_priority() {
            Ok(sched) => sched,
            Err(e) => {
                error!(%e, "cannot query scheduler for clock driver");
                panic!("cannot query scheduler for clock driver: {e}");
            }
        };

        self.shared.stop.store(false, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        let handle = thread::Builder::new()
            .name("wallclock-driver".into())
            .spawn(move || driver_main(&shared, period, sched))
            .unwrap_or_else(|e| {
                error!(%e, "cannot spawn clock driver thread");
                panic!("cannot spawn clock driver thread: {e}");
            });

        *slot = Some(handle);
        info!(period_us = period.as_micros() as u64, "clock driver started");
    }

    /// Stop the clock driver and wait for it to exit.
    ///
    /// Worst-case latency is one period plus one sleep (the loop observes
    /// the flag at the top of each iteration). Safe no-op when no driver
    /// is running.
    ///
    /// # Panics
    ///
    /// Panics if the driver thread itself panicked; join failure has no
    /// safe local recovery.
    fn stop_driver(&self) {
        let mut slot = self.driver_slot();
        if let Some(handle) = slot.take() {
            self.shared.stop.store(true, Ordering::Release);
            if handle.join().is_err() {
                error!("clock driver thread panicked");
                panic!("cannot stop clock driver: thread panicked");
            }
            debug!("clock driver stopped");
        }
    }

    /// Shutdown must keep working even if a panicking starter poisoned
    /// the slot lock.
    fn driver_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clock driver body: advance the tick clock, fan the signal out, sleep.
fn driver_main(shared: &DriverShared, period: Duration, sched: DriverSched) {
    realtime::apply_to_current_thread(sched);
    debug!("clock driver running");

    while !shared.stop.load(Ordering::Acquire) {
        tick::advance();

        if shared.events_enabled.load(Ordering::Relaxed) {
            // Lock scope ends before the sleep: the registry is only held
            // for the walk itself.
            shared.registry.deliver(PROFILING_SIGNAL);
        }

        thread::sleep(period);
    }
}

impl EventSource for WallClockEventSource {
    /// The callback count is informational for this strategy; the shared
    /// driver starts and stops on the lifecycle hooks instead.
    fn register_thread(&self, _callback_count: usize) {
        self.shared.registry.register_current();
    }

    fn registered_callback(&self, new_callback_count: usize) {
        // The driver is shared across callbacks: only the first one
        // brings it up.
        if new_callback_count == 1 {
            self.start_driver();
        }
    }

    fn unregistered_callback(&self, new_callback_count: usize) {
        if new_callback_count == 0 {
            self.stop_driver();
        }
    }

    /// Stops the driver unconditionally; frequency and registry are left
    /// intact so the source can be restarted.
    fn reset(&self) {
        self.stop_driver();
    }

    fn signal(&self) -> Option<Signal> {
        Some(PROFILING_SIGNAL)
    }

    fn enable_events(&self) {
        self.shared.events_enabled.store(true, Ordering::Relaxed);
    }

    fn disable_events(&self) {
        self.shared.events_enabled.store(false, Ordering::Relaxed);
    }

    fn ticks_since_last_call(&self) -> u32 {
        tick::ticks_since_last_call()
    }
}

impl Drop for WallClockEventSource {
    fn drop(&mut self) {
        self.stop_driver();
    }
}
