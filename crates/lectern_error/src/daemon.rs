//! Daemon lifecycle error types.

use std::path::PathBuf;

/// Daemon lifecycle failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DaemonErrorKind {
    /// Another live process owns the PID file
    #[display("Daemon already running (PID {})", _0)]
    AlreadyRunning(u32),
    /// The PID file could not be read, written or removed
    #[display("PID file {}: {}", path.display(), message)]
    PidFile {
        /// Path of the PID file
        path: PathBuf,
        /// Error message
        message: String,
    },
    /// Sending a signal to the daemon failed
    #[display("Signal delivery failed: {}", _0)]
    Signal(String),
    /// The daemon survived SIGTERM and SIGKILL
    #[display("Daemon (PID {}) is still running", _0)]
    StillRunning(u32),
    /// A schedule entry could not be turned into a timer
    #[display("Invalid schedule '{}': {}", name, reason)]
    InvalidSchedule {
        /// Job name
        name: String,
        /// Why it was rejected
        reason: String,
    },
    /// Installing signal handlers or spawning tasks failed
    #[display("Runtime failure: {}", _0)]
    Runtime(String),
}

/// Daemon error with location tracking.
///
/// # Examples
///
/// ```
/// use lectern_error::{DaemonError, DaemonErrorKind};
///
/// let err = DaemonError::new(DaemonErrorKind::AlreadyRunning(4242));
/// assert!(format!("{}", err).contains("4242"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Daemon Error: {} at line {} in {}", kind, line, file)]
pub struct DaemonError {
    kind: DaemonErrorKind,
    line: u32,
    file: &'static str,
}

impl DaemonError {
    /// Create a new daemon error with caller location tracking.
    #[track_caller]
    pub fn new(kind: DaemonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DaemonErrorKind {
        &self.kind
    }
}
