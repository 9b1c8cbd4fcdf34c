//! Scheduling priority for the clock driver thread.
//!
//! The driver should preempt the threads it samples, so it asks for the
//! highest priority its current scheduling policy allows. Elevation is
//! best-effort: being denied (typically EPERM without CAP_SYS_NICE) only
//! degrades timing accuracy, while failure of the platform *query* itself
//! means something is wrong enough that startup must not proceed.
//!
//! These are raw `libc` calls; `nix` has no wrapper for
//! `sched_get_priority_max`.

#![allow(unsafe_code)]

use prof_common::error::{ProfError, ProfResult};
use tracing::{debug, warn};

/// Policy and priority to request for the driver thread.
#[derive(Debug, Clone, Copy)]
pub struct DriverSched {
    policy: libc::c_int,
    priority: libc::c_int,
}

impl DriverSched {
    /// The priority that will be requested.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Query the calling thread's scheduling policy and the maximum priority
/// that policy supports.
///
/// # Errors
///
/// Returns a [`ProfError::Platform`] error if either query fails; the
/// caller treats that as fatal since the platform scheduler is in an
/// unusable state.
pub fn query_max_priority() -> ProfResult<DriverSched> {
    let mut policy: libc::c_int = 0;
    let mut param = libc::sched_param { sched_priority: 0 };

    // SAFETY: out-pointers reference locals that outlive the call.
    let err = unsafe { libc::pthread_getschedparam(libc::pthread_self(), &mut policy, &mut param) };
    if err != 0 {
        return Err(ProfError::Platform {
            call: "pthread_getschedparam",
            detail: std::io::Error::from_raw_os_error(err).to_string(),
        });
    }

    // SAFETY: takes a plain policy value.
    let priority = unsafe { libc::sched_get_priority_max(policy) };
    if priority == -1 {
        return Err(ProfError::Platform {
            call: "sched_get_priority_max",
            detail: std::io::Error::last_os_error().to_string(),
        });
    }

    Ok(DriverSched { policy, priority })
}

/// Apply `sched` to the calling thread, best-effort.
///
/// Denied elevation is logged and ignored: the driver still runs, just
/// without preference over the threads it samples.
pub fn apply_to_current_thread(sched: DriverSched) {
    let param = libc::sched_param {
        sched_priority: sched.priority,
    };

    // SAFETY: param outlives the call.
    let err = unsafe { libc::pthread_setschedparam(libc::pthread_self(), sched.policy, &param) };
    match err {
        0 => debug!(
            policy = sched.policy,
            priority = sched.priority,
            "clock driver priority applied"
        ),
        libc::EPERM => warn!(
            "pthread_setschedparam denied (EPERM) - clock driver runs without \
             elevated priority; grant CAP_SYS_NICE for better sampling accuracy"
        ),
        err => warn!(
            errno = err,
            "pthread_setschedparam failed; clock driver runs without elevated priority"
        ),
    }
}
