//! Daemon start and shutdown.

use async_trait::async_trait;
use lectern_config::{JobAction, JobSpec, ScheduleConfig, Settings};
use lectern_core::LessonKind;
use lectern_error::GenerationError;
use lectern_models::{CompletionDriver, CompletionParams};
use lectern_server::{Daemon, DaemonContext, DaemonExit};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct Offline;

#[async_trait]
impl CompletionDriver for Offline {
    async fn complete(&self, _: &str, _: CompletionParams) -> Result<String, GenerationError> {
        Err(GenerationError::new(
            lectern_error::GenerationErrorKind::MissingApiKey,
        ))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

fn settings(workdir: &Path, auto_generate: bool) -> Settings {
    let mut map = HashMap::new();
    map.insert("LEARNING_TIMEZONE".to_string(), "UTC".to_string());
    map.insert("AUTO_GENERATE".to_string(), auto_generate.to_string());
    Settings::from_map(workdir, &map).unwrap()
}

fn context(workdir: &Path, auto_generate: bool) -> DaemonContext {
    DaemonContext::with_parts(
        settings(workdir, auto_generate),
        ScheduleConfig::default(),
        Arc::new(Offline),
        None,
    )
    .unwrap()
}

/// One series lesson every second.
fn every_second() -> ScheduleConfig {
    ScheduleConfig::new(vec![JobSpec::new(
        "every-second",
        "* * * * * *",
        JobAction::Lesson {
            kind: LessonKind::Series,
            title: "Tick".to_string(),
            focus: "timing".to_string(),
        },
    )])
    .unwrap()
}

fn lesson_files(workdir: &Path) -> usize {
    let Ok(days) = std::fs::read_dir(workdir.join("daily-lessons")) else {
        return 0;
    };
    days.flatten()
        .flat_map(|day| std::fs::read_dir(day.path()).into_iter().flatten().flatten())
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "md"))
        .count()
}

/// Panics on the first call, then answers.
#[derive(Default)]
struct PanicsOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionDriver for PanicsOnce {
    async fn complete(&self, _: &str, _: CompletionParams) -> Result<String, GenerationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("driver blew up");
        }
        Ok("## Tick\n\nA lesson.".to_string())
    }

    fn model_name(&self) -> &str {
        "panics-once"
    }
}

/// Takes three seconds to answer.
#[derive(Default)]
struct Slow {
    started: AtomicUsize,
    finished: AtomicUsize,
}

#[async_trait]
impl CompletionDriver for Slow {
    async fn complete(&self, _: &str, _: CompletionParams) -> Result<String, GenerationError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok("## Slow\n\nA lesson.".to_string())
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn holds_pid_file_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("logs").join("daemon.pid");
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let daemon = Daemon::new(context(dir.path(), true));
    let handle = tokio::spawn(daemon.run_until(async move {
        let _ = rx.await;
    }));

    let mut waited = Duration::ZERO;
    while !pid_file.exists() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    assert!(pid_file.exists());

    tx.send(()).unwrap();
    let exit = handle.await.unwrap().unwrap();
    assert_eq!(exit, DaemonExit::Stopped);
    assert!(!pid_file.exists());

    let welcome = std::fs::read_dir(dir.path().join("daily-lessons"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let lessons: Vec<_> = std::fs::read_dir(welcome).unwrap().collect();
    assert_eq!(lessons.len(), 1);
}

#[tokio::test]
async fn refuses_when_another_daemon_is_alive() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("logs").join("daemon.pid");
    std::fs::create_dir_all(pid_file.parent().unwrap()).unwrap();
    let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    std::fs::write(&pid_file, child.id().to_string()).unwrap();

    let exit = Daemon::new(context(dir.path(), false))
        .run_until(std::future::pending())
        .await
        .unwrap();

    assert_eq!(exit, DaemonExit::Refused(child.id()));
    assert_eq!(
        std::fs::read_to_string(&pid_file).unwrap().trim(),
        child.id().to_string()
    );
    child.kill().unwrap();
    child.wait().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_firing_does_not_stop_later_firings() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Arc::new(PanicsOnce::default());
    let ctx = DaemonContext::with_parts(
        settings(dir.path(), false),
        every_second(),
        driver.clone(),
        None,
    )
    .unwrap();

    let exit = Daemon::new(ctx)
        .run_until(tokio::time::sleep(Duration::from_millis(4500)))
        .await
        .unwrap();

    assert_eq!(exit, DaemonExit::Stopped);
    assert!(driver.calls.load(Ordering::SeqCst) >= 3);
    assert!(lesson_files(dir.path()) >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_aborts_in_flight_firings() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Arc::new(Slow::default());
    let ctx = DaemonContext::with_parts(
        settings(dir.path(), false),
        every_second(),
        driver.clone(),
        None,
    )
    .unwrap();

    Daemon::new(ctx)
        .run_until(tokio::time::sleep(Duration::from_millis(1500)))
        .await
        .unwrap();
    assert!(driver.started.load(Ordering::SeqCst) >= 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(driver.finished.load(Ordering::SeqCst), 0);
    assert_eq!(lesson_files(dir.path()), 0);
}
