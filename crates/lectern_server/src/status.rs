//! Daemon status for `lectern status`.

use crate::pid::{process_exists, read_pid};
use lectern_config::Settings;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const LOG_TAIL_LINES: usize = 5;
const TAIL_CHUNK: u64 = 8 * 1024;

/// A snapshot of the daemon's state on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct DaemonStatus {
    /// PID file location
    pid_file: PathBuf,
    /// PID recorded in the file
    pid: Option<u32>,
    /// Whether that PID is alive
    running: bool,
    /// Daemon log location
    log_file: PathBuf,
    /// Last lines of the daemon log, oldest first
    log_tail: Vec<String>,
}

impl DaemonStatus {
    /// Reads the PID file and the tail of the daemon log.
    pub fn collect(settings: &Settings) -> Self {
        Self::from_paths(settings.pid_file(), settings.log_file())
    }

    /// Like [`DaemonStatus::collect`] with explicit paths.
    pub fn from_paths(pid_file: impl Into<PathBuf>, log_file: impl Into<PathBuf>) -> Self {
        let pid_file = pid_file.into();
        let log_file = log_file.into();
        let pid = read_pid(&pid_file).ok().flatten();
        let running = pid.is_some_and(process_exists);
        let log_tail = tail(&log_file, LOG_TAIL_LINES);
        Self {
            pid_file,
            pid,
            running,
            log_file,
            log_tail,
        }
    }
}

fn tail(path: &Path, lines: usize) -> Vec<String> {
    read_tail(path, lines).unwrap_or_default()
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Reads `path` backwards in fixed chunks until `lines` non-empty lines are
/// complete.
fn read_tail(path: &Path, lines: usize) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut pos = file.metadata()?.len();
    let mut buf: Vec<u8> = Vec::new();
    while pos > 0 {
        let step = TAIL_CHUNK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        // The first segment may be cut mid-line until the start is reached.
        let complete = buf
            .split(|b| *b == b'\n')
            .skip(1)
            .filter(|l| !is_blank(l))
            .count();
        if complete >= lines {
            break;
        }
    }
    let start = if pos > 0 {
        buf.iter().position(|b| *b == b'\n').map_or(buf.len(), |i| i + 1)
    } else {
        0
    };
    let text = String::from_utf8_lossy(&buf[start..]);
    let kept: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    Ok(kept[kept.len().saturating_sub(lines)..]
        .iter()
        .map(|l| l.to_string())
        .collect())
}

impl std::fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.pid, self.running) {
            (Some(pid), true) => writeln!(f, "Daemon: running (PID {})", pid)?,
            (Some(pid), false) => writeln!(
                f,
                "Daemon: stopped (stale PID {} in {})",
                pid,
                self.pid_file.display()
            )?,
            (None, _) => writeln!(f, "Daemon: stopped")?,
        }
        if self.log_tail.is_empty() {
            write!(f, "No log entries in {}", self.log_file.display())
        } else {
            writeln!(f, "Recent log ({}):", self.log_file.display())?;
            for line in &self.log_tail {
                writeln!(f, "  {}", line)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("daemon.log");
        let content: String = (1..=8).map(|i| format!("line {}\n", i)).collect();
        std::fs::write(&log, content).unwrap();

        let status = DaemonStatus::from_paths(dir.path().join("daemon.pid"), &log);
        assert_eq!(
            status.log_tail,
            vec!["line 4", "line 5", "line 6", "line 7", "line 8"]
        );
        assert!(!status.running);
        assert!(status.to_string().starts_with("Daemon: stopped"));
    }

    #[test]
    fn tail_of_large_log_spans_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("daemon.log");
        let mut content: String = (1..=50_000)
            .map(|i| format!("2026-03-02T09:00:00Z INFO firing job {}\n", i))
            .collect();
        content.push_str(&format!("{}\n\n", "é".repeat(6000)));
        content.push_str("last line\n\n\n");
        std::fs::write(&log, &content).unwrap();
        assert!(content.len() as u64 > 100 * TAIL_CHUNK);

        let tail = read_tail(&log, 5).unwrap();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "2026-03-02T09:00:00Z INFO firing job 49998");
        assert_eq!(tail[2], "2026-03-02T09:00:00Z INFO firing job 50000");
        assert_eq!(tail[3], "é".repeat(6000));
        assert_eq!(tail[4], "last line");
    }

    #[test]
    fn tail_of_short_log_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("daemon.log");
        std::fs::write(&log, "only\n\nlines").unwrap();

        assert_eq!(read_tail(&log, 5).unwrap(), vec!["only", "lines"]);
        assert!(tail(&dir.path().join("missing.log"), 5).is_empty());
    }

    #[test]
    fn own_pid_reads_running() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("daemon.pid");
        std::fs::write(&pid_file, std::process::id().to_string()).unwrap();

        let status = DaemonStatus::from_paths(&pid_file, dir.path().join("missing.log"));
        assert!(status.running);
        assert!(status.log_tail.is_empty());
    }
}
