//! The Lectern daemon.
//!
//! [`Daemon`] owns the PID lock and one timer task per scheduled job. Each
//! firing runs the pipeline in [`pipeline`] in its own task against a shared,
//! immutable [`DaemonContext`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod daemon;
mod pid;
pub mod pipeline;
mod runlog;
mod schedule;
mod status;

pub use context::DaemonContext;
pub use daemon::{Daemon, DaemonExit};
pub use pid::{PidLock, StopOutcome, process_exists, read_live_pid, read_pid, stop_daemon};
pub use pipeline::{JobReport, LessonRun};
pub use runlog::{RunLog, RunRecord};
pub use schedule::{Schedule, ScheduleType};
pub use status::DaemonStatus;
