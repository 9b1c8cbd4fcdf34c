//! The registry of threads eligible to receive sampling signals.
//!
//! A mutex-guarded list of pthread handles. The registry records
//! interest, never ownership: threads do not cooperate in their own
//! removal, so handles whose thread has terminated are discovered and
//! pruned lazily during signal fan-out. Critical sections are bounded
//! (insertion, walk, erase) and never extend across a sleep or a
//! callback.

use nix::errno::Errno;
use nix::sys::pthread::{pthread_kill, pthread_self, Pthread};
use nix::sys::signal::Signal;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Threads currently interested in receiving wall-clock events.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    threads: Mutex<Vec<Pthread>>,
}

impl ThreadRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the calling thread's handle.
    ///
    /// Blocks until the registry lock is available. Not idempotent: a
    /// thread registering twice will be signalled twice per period.
    pub fn register_current(&self) {
        self.lock().push(pthread_self());
    }

    /// Number of handles currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if no threads are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `signal` to every registered thread, pruning handles whose
    /// thread no longer exists.
    pub fn deliver(&self, signal: Signal) {
        self.sweep(|thread| pthread_kill(thread, signal));
    }

    /// Walk the registry applying `send` to each handle.
    ///
    /// Outcome taxonomy, per handle:
    /// - `Ok`: keep, move on.
    /// - `ESRCH`: the thread is gone; erase the handle. This is the sole
    ///   removal path out of the registry.
    /// - anything else: log and keep; never aborts the walk.
    fn sweep<F>(&self, mut send: F)
    where
        F: FnMut(Pthread) -> nix::Result<()>,
    {
        self.lock().retain(|&thread| match send(thread) {
            Ok(()) => true,
            Err(Errno::ESRCH) => {
                debug!(?thread, "pruning terminated thread");
                false
            }
            Err(Errno::EINVAL) => {
                // Shouldn't happen
                warn!("error sending signal: EINVAL");
                true
            }
            Err(err) => {
                // _Really_ shouldn't happen
                warn!(%err, "unknown error sending signal");
                true
            }
        });
    }

    /// The registry must keep serving delivery and shutdown even if a
    /// panicking registrant poisoned the lock.
    fn lock(&self) -> MutexGuard<'_, Vec<Pthread>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
