//! PID lock behavior against real processes.

use lectern_error::DaemonErrorKind;
use lectern_server::{PidLock, StopOutcome, read_live_pid, stop_daemon};
use std::process::{Child, Command};

fn sleeper() -> Child {
    Command::new("sleep").arg("30").spawn().unwrap()
}

#[test]
fn refuses_live_owner_then_takes_over_when_dead() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("logs").join("daemon.pid");
    std::fs::create_dir_all(pid_file.parent().unwrap()).unwrap();

    let mut child = sleeper();
    std::fs::write(&pid_file, child.id().to_string()).unwrap();

    let err = PidLock::try_acquire(&pid_file).unwrap_err();
    assert_eq!(err.kind(), &DaemonErrorKind::AlreadyRunning(child.id()));
    assert_eq!(read_live_pid(&pid_file), Some(child.id()));

    child.kill().unwrap();
    child.wait().unwrap();

    let lock = PidLock::try_acquire(&pid_file).unwrap();
    let recorded = std::fs::read_to_string(&pid_file).unwrap();
    assert_eq!(recorded.trim(), std::process::id().to_string());

    drop(lock);
    assert!(!pid_file.exists());
}

#[test]
fn garbage_pid_file_is_stale() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("daemon.pid");
    std::fs::write(&pid_file, "not a pid").unwrap();

    let lock = PidLock::try_acquire(&pid_file).unwrap();
    assert_eq!(lock.pid(), std::process::id());
}

#[test]
fn creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("nested").join("logs").join("daemon.pid");

    let lock = PidLock::try_acquire(&pid_file).unwrap();
    assert!(lock.path().exists());
}

#[tokio::test]
async fn stop_terminates_recorded_process() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("daemon.pid");
    let mut child = sleeper();
    let pid = child.id();
    std::fs::write(&pid_file, pid.to_string()).unwrap();

    // Reap the child as soon as it exits so the liveness check sees it gone.
    let reaper = std::thread::spawn(move || child.wait());

    let outcome = stop_daemon(&pid_file).await.unwrap();
    assert_eq!(outcome, StopOutcome::Stopped(pid));
    assert!(!pid_file.exists());
    reaper.join().unwrap().unwrap();
}

#[tokio::test]
async fn stop_without_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = stop_daemon(&dir.path().join("daemon.pid")).await.unwrap();
    assert_eq!(outcome, StopOutcome::NotRunning);
}

#[tokio::test]
async fn stop_removes_stale_file() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("daemon.pid");
    let mut child = sleeper();
    let pid = child.id();
    child.kill().unwrap();
    child.wait().unwrap();
    std::fs::write(&pid_file, pid.to_string()).unwrap();

    let outcome = stop_daemon(&pid_file).await.unwrap();
    assert_eq!(outcome, StopOutcome::StaleRemoved);
    assert!(!pid_file.exists());
}
