//! Single-instance PID lock.

use lectern_error::{DaemonError, DaemonErrorKind};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const STOP_GRACE: Duration = Duration::from_secs(5);
const STOP_POLL: Duration = Duration::from_millis(100);
const KILL_SETTLE: Duration = Duration::from_millis(500);
const ACQUIRE_ATTEMPTS: usize = 3;

/// Whether `pid` names a live process (signal 0).
///
/// A process owned by another user answers `EPERM` and counts as alive.
pub fn process_exists(pid: u32) -> bool {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => matches!(kill(Pid::from_raw(raw), None), Ok(()) | Err(Errno::EPERM)),
        _ => false,
    }
}

fn pid_error(path: &Path, message: impl std::fmt::Display) -> DaemonError {
    DaemonError::new(DaemonErrorKind::PidFile {
        path: path.to_path_buf(),
        message: message.to_string(),
    })
}

/// Reads the PID recorded in `path`, if any.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read. Unparseable
/// content reads as `None`.
pub fn read_pid(path: &Path) -> Result<Option<u32>, DaemonError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.trim().parse().ok()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(pid_error(path, e)),
    }
}

/// The PID in `path` if that process is alive.
pub fn read_live_pid(path: &Path) -> Option<u32> {
    read_pid(path).ok().flatten().filter(|pid| process_exists(*pid))
}

/// Ownership of the PID file for the life of the daemon.
///
/// Dropping the lock removes the file.
#[derive(Debug)]
pub struct PidLock {
    path: PathBuf,
    pid: u32,
}

impl PidLock {
    /// Claims `path` for this process.
    ///
    /// A file naming a dead process, or holding garbage, is stale and is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonErrorKind::AlreadyRunning`] when a live process owns
    /// the file, or a PID file error if it cannot be written.
    pub fn try_acquire(path: impl Into<PathBuf>) -> Result<Self, DaemonError> {
        let path = path.into();
        let pid = std::process::id();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| pid_error(parent, e))?;
        }

        for _ in 0..ACQUIRE_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(pid.to_string().as_bytes())
                        .map_err(|e| pid_error(&path, e))?;
                    info!(pid, path = %path.display(), "Acquired PID lock");
                    return Ok(Self { path, pid });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    match read_pid(&path)? {
                        Some(owner) if owner != pid && process_exists(owner) => {
                            return Err(DaemonError::new(DaemonErrorKind::AlreadyRunning(owner)));
                        }
                        stale => {
                            warn!(pid = ?stale, path = %path.display(), "Removing stale PID file");
                            match std::fs::remove_file(&path) {
                                Ok(()) => {}
                                Err(e) if e.kind() == ErrorKind::NotFound => {}
                                Err(e) => return Err(pid_error(&path, e)),
                            }
                        }
                    }
                }
                Err(e) => return Err(pid_error(&path, e)),
            }
        }
        Err(pid_error(&path, "lost the race for the PID file"))
    }

    /// The locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// This process's PID.
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        // Leave the file alone if another process has since claimed it.
        if let Ok(Some(owner)) = read_pid(&self.path) {
            if owner != self.pid {
                return;
            }
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Released PID lock"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove PID file"),
        }
    }
}

/// What [`stop_daemon`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No PID file
    NotRunning,
    /// The PID file named a dead process and was removed
    StaleRemoved,
    /// The daemon exited after SIGTERM
    Stopped(u32),
    /// The daemon needed SIGKILL
    Killed(u32),
}

/// Stops the daemon recorded in `path`: SIGTERM, up to five seconds of grace, then SIGKILL.
///
/// The PID file is removed in every successful case.
///
/// # Errors
///
/// Returns an error if a signal cannot be delivered or the process survives SIGKILL.
pub async fn stop_daemon(path: &Path) -> Result<StopOutcome, DaemonError> {
    let Some(pid) = read_pid(path)? else {
        if path.exists() {
            remove(path)?;
            return Ok(StopOutcome::StaleRemoved);
        }
        return Ok(StopOutcome::NotRunning);
    };
    if !process_exists(pid) {
        info!(pid, "Daemon not running, removing stale PID file");
        remove(path)?;
        return Ok(StopOutcome::StaleRemoved);
    }

    let target = i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|e| DaemonError::new(DaemonErrorKind::Signal(e.to_string())))?;
    info!(pid, "Sending SIGTERM");
    kill(target, Signal::SIGTERM)
        .map_err(|e| DaemonError::new(DaemonErrorKind::Signal(e.to_string())))?;

    let deadline = tokio::time::Instant::now() + STOP_GRACE;
    while tokio::time::Instant::now() < deadline {
        if !process_exists(pid) {
            info!(pid, "Daemon stopped");
            remove(path)?;
            return Ok(StopOutcome::Stopped(pid));
        }
        tokio::time::sleep(STOP_POLL).await;
    }

    warn!(pid, "Daemon ignored SIGTERM, sending SIGKILL");
    kill(target, Signal::SIGKILL)
        .map_err(|e| DaemonError::new(DaemonErrorKind::Signal(e.to_string())))?;
    tokio::time::sleep(KILL_SETTLE).await;
    if process_exists(pid) {
        return Err(DaemonError::new(DaemonErrorKind::StillRunning(pid)));
    }
    remove(path)?;
    Ok(StopOutcome::Killed(pid))
}

fn remove(path: &Path) -> Result<(), DaemonError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(pid_error(path, e)),
    }
}
