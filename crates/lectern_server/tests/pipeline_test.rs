//! End-to-end pipeline runs against a failing completion endpoint.

use async_trait::async_trait;
use lectern_config::{JobAction, ScheduleConfig, Settings};
use lectern_core::{LessonKind, LessonRequest, SinkKind};
use lectern_delivery::{MailMessage, MailTransport};
use lectern_error::DeliveryError;
use lectern_generator::{WelcomeStatus, fallback_body};
use lectern_models::OpenRouterClient;
use lectern_server::pipeline::{action_for, ensure_welcome, run_lesson, run_once};
use lectern_server::DaemonContext;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}

fn settings(workdir: &Path, extra: &[(&str, &str)]) -> Settings {
    let mut map: HashMap<String, String> = [
        ("OPENROUTER_API_KEY", "sk-or-v1-test"),
        ("EMAIL_USER", "me@example.com"),
        ("EMAIL_APP_PASSWORD", "abcd efgh ijkl mnop"),
        ("LEARNING_TIMEZONE", "UTC"),
        (
            "DESKTOP_NOTIFICATION_PATH",
            workdir.join("notice.txt").to_str().unwrap(),
        ),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        map.insert(k.to_string(), v.to_string());
    }
    Settings::from_map(workdir, &map).unwrap()
}

async fn failing_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

fn context(settings: Settings, server: &MockServer, mailer: Arc<RecordingMailer>) -> DaemonContext {
    let driver = Arc::new(
        OpenRouterClient::new(settings.api_key().clone(), server.uri(), settings.model().clone())
            .unwrap(),
    );
    let mailer: Arc<dyn MailTransport> = mailer;
    DaemonContext::with_parts(settings, ScheduleConfig::default(), driver, Some(mailer)).unwrap()
}

#[tokio::test]
async fn failing_api_still_writes_and_mails_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let server = failing_api().await;
    let mailer = Arc::new(RecordingMailer::default());
    let ctx = context(settings(dir.path(), &[]), &server, mailer.clone());

    let request = LessonRequest::new(LessonKind::ProTip, "Test Title", "x");
    let run = run_lesson(&ctx, &request).await.unwrap();

    let content = std::fs::read_to_string(run.path()).unwrap();
    assert!(content.contains("Test Title"));
    let expected = fallback_body(&LessonKind::ProTip, "Test Title", WelcomeStatus::default());
    assert!(content.contains(&expected));
    assert!(run.path().starts_with(dir.path().join("daily-lessons")));

    let outcome = |sink: SinkKind| {
        run.deliveries()
            .iter()
            .find(|r| *r.sink() == sink)
            .unwrap()
            .outcome()
            .clone()
    };
    assert!(outcome(SinkKind::Email).is_sent());
    assert!(outcome(SinkKind::Discord).is_skipped());
    assert!(outcome(SinkKind::Telegram).is_skipped());
    assert!(outcome(SinkKind::Backup).is_skipped());
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn welcome_written_once_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let server = failing_api().await;
    let mailer = Arc::new(RecordingMailer::default());
    let ctx = context(
        settings(dir.path(), &[("AUTO_GENERATE", "true")]),
        &server,
        mailer,
    );

    let first = ensure_welcome(&ctx).await.unwrap().unwrap();
    assert!(first.artifact().body().contains("System Status: Ready"));
    assert!(ensure_welcome(&ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn welcome_disabled_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let server = failing_api().await;
    let ctx = context(
        settings(dir.path(), &[]),
        &server,
        Arc::new(RecordingMailer::default()),
    );
    assert!(ensure_welcome(&ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn one_shot_runs_append_ndjson() {
    let dir = tempfile::tempdir().unwrap();
    let server = failing_api().await;
    let ctx = context(
        settings(dir.path(), &[]),
        &server,
        Arc::new(RecordingMailer::default()),
    );

    let action = action_for(&ctx, "expert", None);
    assert_eq!(
        action,
        JobAction::Lesson {
            kind: LessonKind::Expert,
            title: "Expert Level - Only PRO Can Do".to_string(),
            focus: "master_level".to_string(),
        }
    );
    let lesson = run_once(&ctx, &action).await.unwrap();
    assert!(*lesson.success());
    assert!(lesson.source().as_deref().unwrap().starts_with("fallback:"));

    let summary = run_once(&ctx, &action_for(&ctx, "weekly-summary", None))
        .await
        .unwrap();
    assert_eq!(*summary.lessons(), Some(1));

    let records = ctx.run_log().read_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].job(), "expert");
    assert_eq!(records[1].job(), "weekly-summary");
    let raw = std::fs::read_to_string(dir.path().join("logs/github-actions.log")).unwrap();
    assert_eq!(raw.lines().count(), 2);
}

#[tokio::test]
async fn title_override_and_unscheduled_kind() {
    let dir = tempfile::tempdir().unwrap();
    let server = failing_api().await;
    let ctx = context(
        settings(dir.path(), &[]),
        &server,
        Arc::new(RecordingMailer::default()),
    );

    let action = action_for(&ctx, "pro-tip", Some("Custom".to_string()));
    assert!(matches!(action, JobAction::Lesson { ref title, .. } if title == "Custom"));

    let action = action_for(&ctx, "weekly-deep-dive", None);
    assert!(matches!(
        action,
        JobAction::Lesson { kind: LessonKind::WeeklyDeepDive, .. }
    ));
}
