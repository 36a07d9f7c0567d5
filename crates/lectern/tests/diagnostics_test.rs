//! Configuration check tests.

use async_trait::async_trait;
use lectern::diagnostics::{CheckSummary, api_hint, run_check, webhook_hint};
use lectern::{
    CompletionDriver, CompletionParams, DeliveryError, DeliveryErrorKind, GenerationError,
    GenerationErrorKind, MailMessage, MailTransport, Settings,
};
use std::collections::HashMap;
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedDriver(Result<String, GenerationErrorKind>);

#[async_trait]
impl CompletionDriver for FixedDriver {
    async fn complete(
        &self,
        _prompt: &str,
        params: CompletionParams,
    ) -> Result<String, GenerationError> {
        assert_eq!(params, CompletionParams::CONNECTIVITY);
        self.0.clone().map_err(GenerationError::new)
    }

    fn model_name(&self) -> &str {
        "test/model"
    }
}

#[derive(Default)]
struct FakeMailer {
    reject_login: bool,
    sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        if self.reject_login {
            Err(DeliveryError::new(DeliveryErrorKind::Smtp(
                "535 authentication failed".to_string(),
            )))
        } else {
            Ok(())
        }
    }
}

fn settings(pairs: &[(&str, &str)]) -> Settings {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_map("/tmp/lectern-check", &map).unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn configured() -> Settings {
    settings(&[
        ("OPENROUTER_API_KEY", "sk-or-v1-test"),
        ("EMAIL_USER", "me@example.com"),
        ("EMAIL_APP_PASSWORD", "abcd efgh ijkl mnop"),
        ("NOTIFICATION_EMAIL", "inbox@example.com"),
    ])
}

#[tokio::test]
async fn all_checks_pass() {
    let driver = FixedDriver(Ok("Keep your selectors close to user intent.".to_string()));
    let mailer = FakeMailer::default();
    let transport: &dyn MailTransport = &mailer;
    let mut out = Vec::new();

    let summary = run_check(&configured(), &driver, Some(transport), &client(), &mut out)
        .await
        .unwrap();
    let report = String::from_utf8(out).unwrap();

    assert_eq!(
        summary,
        CheckSummary {
            api_ok: true,
            email_ok: true,
            ..Default::default()
        }
    );
    assert!(report.contains("16 characters, ok"));
    assert!(report.contains("Keep your selectors"));
    assert!(report.contains("Test email sent to inbox@example.com"));
    assert!(report.contains("Discord skipped: DISCORD_WEBHOOK not set"));
    assert!(report.contains("System ready"));
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to(), "inbox@example.com");
}

#[tokio::test]
async fn unauthorized_api_and_rejected_login_give_hints() {
    let driver = FixedDriver(Err(GenerationErrorKind::Status {
        status: 401,
        body: "bad key".to_string(),
    }));
    let mailer = FakeMailer {
        reject_login: true,
        ..Default::default()
    };
    let transport: &dyn MailTransport = &mailer;
    let mut out = Vec::new();

    let summary = run_check(&configured(), &driver, Some(transport), &client(), &mut out)
        .await
        .unwrap();
    let report = String::from_utf8(out).unwrap();

    assert_eq!(summary, CheckSummary::default());
    assert!(report.contains("Check your API key"));
    assert!(report.contains("https://myaccount.google.com/apppasswords"));
    assert!(report.contains("https://openrouter.ai/"));
    assert!(report.contains("Setup incomplete"));
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_email_is_skipped() {
    let settings = settings(&[("OPENROUTER_API_KEY", "sk-or-v1-test")]);
    let driver = FixedDriver(Ok("ok".to_string()));
    let mut out = Vec::new();

    let summary = run_check(&settings, &driver, None, &client(), &mut out).await.unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(summary.api_ok);
    assert!(!summary.email_ok);
    assert!(report.contains("EMAIL_USER: MISSING"));
    assert!(report.contains("skipped: EMAIL_USER or EMAIL_APP_PASSWORD not set"));
    assert!(report.contains("API ready"));
}

#[tokio::test]
async fn short_app_password_is_flagged() {
    let settings = settings(&[
        ("EMAIL_USER", "me@example.com"),
        ("EMAIL_APP_PASSWORD", "short"),
    ]);
    let driver = FixedDriver(Err(GenerationErrorKind::MissingApiKey));
    let mut out = Vec::new();

    run_check(&settings, &driver, None, &client(), &mut out).await.unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.contains("5 characters, expected 16"));
    assert!(report.contains("Add OPENROUTER_API_KEY"));
}

#[tokio::test]
async fn chat_webhooks_get_test_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottok:en/sendMessage"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let discord = format!("{}/api/webhooks/1/gone", server.uri());
    let uri = server.uri();
    let settings = settings(&[
        ("OPENROUTER_API_KEY", "sk-or-v1-test"),
        ("DISCORD_WEBHOOK", discord.as_str()),
        ("TELEGRAM_BOT_TOKEN", "tok:en"),
        ("TELEGRAM_CHAT_ID", "42"),
        ("TELEGRAM_API_URL", uri.as_str()),
    ]);
    let driver = FixedDriver(Ok("ok".to_string()));
    let mut out = Vec::new();

    let summary = run_check(&settings, &driver, None, &client(), &mut out)
        .await
        .unwrap();
    let report = String::from_utf8(out).unwrap();

    assert_eq!(summary.telegram_ok, Some(true));
    assert_eq!(summary.discord_ok, Some(false));
    assert!(report.contains("Telegram test message sent"));
    assert!(report.contains("does not look like a webhook URL"));
    assert!(report.contains("Discord FAILED"));
    assert!(report.contains("Server Settings > Integrations > Webhooks"));
    assert!(!report.contains("none needed"));
}

#[tokio::test]
async fn unconfigured_chats_are_skipped() {
    let settings = settings(&[("OPENROUTER_API_KEY", "sk-or-v1-test")]);
    let driver = FixedDriver(Ok("ok".to_string()));
    let mut out = Vec::new();

    let summary = run_check(&settings, &driver, None, &client(), &mut out)
        .await
        .unwrap();
    let report = String::from_utf8(out).unwrap();

    assert_eq!(summary.discord_ok, None);
    assert_eq!(summary.telegram_ok, None);
    assert!(report.contains("Telegram skipped"));
}

#[test]
fn webhook_hints_name_the_fix() {
    assert_eq!(
        webhook_hint(&DeliveryErrorKind::Rejected(404)),
        "The webhook or token was rejected, check the configured URL and token"
    );
    assert_eq!(
        webhook_hint(&DeliveryErrorKind::Rejected(429)),
        "Rate limited, try again later"
    );
}

#[test]
fn hints_cover_common_statuses() {
    let status = |status| GenerationErrorKind::Status {
        status,
        body: String::new(),
    };
    assert_eq!(api_hint(&status(404)), "Check that the model name is correct");
    assert_eq!(api_hint(&status(429)), "Rate limited, try again later");
    assert_eq!(
        api_hint(&GenerationErrorKind::Timeout(15)),
        "Check your network connection"
    );
}
