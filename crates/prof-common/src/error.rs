use thiserror::Error;

/// Errors raised while configuring or constructing a sampling event source.
///
/// Failures inside the clock driver's delivery loop are never surfaced
/// through this type: a vanished target thread is pruned silently and any
/// other delivery error is logged and skipped. Host misuse (such as
/// double-starting the driver) is fatal and aborts via panic rather than
/// returning an error, since there is no safe local recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfError {
    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A platform call required at a lifecycle boundary failed.
    #[error("platform call {call} failed: {detail}")]
    Platform {
        /// Name of the failing libc call.
        call: &'static str,
        /// OS-reported failure detail.
        detail: String,
    },
}

/// Convenience type alias for profsource operations.
pub type ProfResult<T> = Result<T, ProfError>;
