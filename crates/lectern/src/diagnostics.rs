//! One-shot configuration checks behind `lectern check`.
//!
//! Each step prints what it found and, when something is wrong, how to fix
//! it. Nothing here fails: problems are reported and counted.

use chrono::Utc;
use lectern_config::Settings;
use lectern_delivery::{
    DiscordSink, MailMessage, MailTransport, Sink, TelegramSink, is_discord_webhook_url,
};
use lectern_error::{DeliveryErrorKind, GenerationErrorKind};
use lectern_models::{CompletionDriver, CompletionParams};
use reqwest::Client;
use std::io::Write;
use std::time::Duration;

/// Timeout for the test completion call.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(15);

const CHECK_PROMPT: &str =
    "Reply with one sentence describing a useful test automation habit.";
const API_KEY_URL: &str = "https://openrouter.ai/";
const APP_PASSWORD_URL: &str = "https://myaccount.google.com/apppasswords";
const DISCORD_URL_SHAPE: &str = "https://discord.com/api/webhooks/<id>/<token>";

/// What the checks found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckSummary {
    /// The test completion succeeded
    pub api_ok: bool,
    /// The SMTP login and test email succeeded
    pub email_ok: bool,
    /// The Discord test embed was accepted; `None` when no webhook is set
    pub discord_ok: Option<bool>,
    /// The Telegram test message was accepted; `None` when the bot is not set up
    pub telegram_ok: Option<bool>,
}

impl CheckSummary {
    /// The one-line verdict printed last.
    pub fn verdict(&self) -> &'static str {
        match (self.api_ok, self.email_ok) {
            (true, true) => "System ready! Run: lectern start",
            (true, false) => "API ready. Fix email to receive notifications.",
            (false, true) => "Email ready. Fix the API key for generated lessons.",
            (false, false) => "Setup incomplete. Work through the steps above.",
        }
    }
}

fn mark(present: bool) -> &'static str {
    if present { "set" } else { "MISSING" }
}

/// Hint for a failed completion call.
pub fn api_hint(kind: &GenerationErrorKind) -> &'static str {
    match kind {
        GenerationErrorKind::MissingApiKey => "Add OPENROUTER_API_KEY to the env file",
        GenerationErrorKind::Status { status: 401, .. } => "Check your API key",
        GenerationErrorKind::Status { status: 404, .. } => "Check that the model name is correct",
        GenerationErrorKind::Status { status: 429, .. } => "Rate limited, try again later",
        GenerationErrorKind::Timeout(_) | GenerationErrorKind::Transport(_) => {
            "Check your network connection"
        }
        _ => "Run with --verbose for details",
    }
}

/// Hint for a failed webhook post.
pub fn webhook_hint(kind: &DeliveryErrorKind) -> &'static str {
    match kind {
        DeliveryErrorKind::Rejected(401 | 403 | 404) => {
            "The webhook or token was rejected, check the configured URL and token"
        }
        DeliveryErrorKind::Rejected(400) => "The chat id or payload was rejected",
        DeliveryErrorKind::Rejected(429) => "Rate limited, try again later",
        DeliveryErrorKind::Transport(_) => "Check your network connection and the URL",
        _ => "Run with --verbose for details",
    }
}

/// Runs every check, writing a report to `out`.
///
/// `mailer` is `None` when email credentials are missing; the mail check is
/// then reported as skipped. `client` posts the Discord and Telegram test
/// messages.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub async fn run_check<W: Write>(
    settings: &Settings,
    driver: &dyn CompletionDriver,
    mailer: Option<&dyn MailTransport>,
    client: &Client,
    out: &mut W,
) -> std::io::Result<CheckSummary> {
    let mut summary = CheckSummary::default();

    writeln!(out, "1. Settings")?;
    writeln!(out, "   OPENROUTER_API_KEY: {}", mark(settings.api_configured()))?;
    writeln!(out, "   EMAIL_USER: {}", mark(settings.email_user().is_some()))?;
    writeln!(
        out,
        "   EMAIL_APP_PASSWORD: {}",
        mark(settings.email_app_password().is_some())
    )?;
    if let Some(password) = settings.email_app_password() {
        let chars = password.chars().filter(|c| !c.is_whitespace()).count();
        if settings.app_password_well_formed() {
            writeln!(out, "   App password format: {} characters, ok", chars)?;
        } else {
            writeln!(
                out,
                "   App password format: {} characters, expected 16",
                chars
            )?;
        }
    }

    writeln!(out, "\n2. Completion API ({})", settings.model())?;
    match driver.complete(CHECK_PROMPT, CompletionParams::CONNECTIVITY).await {
        Ok(content) => {
            summary.api_ok = true;
            let preview: String = content.chars().take(100).collect();
            writeln!(out, "   ok: \"{}\"", preview)?;
        }
        Err(e) => {
            writeln!(out, "   FAILED: {}", e.kind())?;
            writeln!(out, "   Hint: {}", api_hint(e.kind()))?;
        }
    }

    writeln!(out, "\n3. Email")?;
    match (mailer, settings.email_user(), settings.recipient()) {
        (Some(mailer), Some(from), Some(to)) => match mailer.verify().await {
            Ok(()) => {
                writeln!(out, "   SMTP login to {} ok", settings.smtp_host())?;
                let message = MailMessage::builder()
                    .from(from.clone())
                    .to(to)
                    .subject("Lectern test email")
                    .html("<p>Your Lectern email settings work. Lessons will arrive here.</p>")
                    .build();
                match message {
                    Ok(message) => match mailer.send(&message).await {
                        Ok(()) => {
                            summary.email_ok = true;
                            writeln!(out, "   Test email sent to {}", to)?;
                        }
                        Err(e) => writeln!(out, "   FAILED to send test email: {}", e.kind())?,
                    },
                    Err(e) => writeln!(out, "   FAILED to build test email: {}", e)?,
                }
            }
            Err(e) => {
                writeln!(out, "   FAILED: {}", e.kind())?;
                writeln!(out, "   To fix a Gmail app password:")?;
                writeln!(out, "   - Turn on 2-step verification")?;
                writeln!(out, "   - Create a password at {}", APP_PASSWORD_URL)?;
                writeln!(out, "   - Put the 16 characters in EMAIL_APP_PASSWORD")?;
            }
        },
        _ => writeln!(out, "   skipped: EMAIL_USER or EMAIL_APP_PASSWORD not set")?,
    }

    writeln!(out, "\n4. Chat webhooks")?;
    let focus = settings.focus_areas().join(", ");
    let discord = DiscordSink::new(
        client.clone(),
        settings.discord_webhook().clone(),
        focus.as_str(),
    );
    match discord.skip_reason() {
        Some(reason) => writeln!(out, "   Discord skipped: {}", reason)?,
        None => {
            if let Some(url) = discord.webhook().filter(|url| !is_discord_webhook_url(url)) {
                let shown: String = url.chars().take(50).collect();
                writeln!(out, "   Warning: '{}' does not look like a webhook URL", shown)?;
                writeln!(out, "   Expected {}", DISCORD_URL_SHAPE)?;
            }
            match discord.send_test(Utc::now()).await {
                Ok(()) => {
                    summary.discord_ok = Some(true);
                    writeln!(out, "   Discord test message sent")?;
                }
                Err(e) => {
                    summary.discord_ok = Some(false);
                    writeln!(out, "   Discord FAILED: {}", e.kind())?;
                    writeln!(out, "   Hint: {}", webhook_hint(e.kind()))?;
                }
            }
        }
    }
    let telegram = TelegramSink::new(
        client.clone(),
        settings.telegram_api_url().clone(),
        settings.telegram_bot_token().clone(),
        settings.telegram_chat_id().clone(),
        focus,
    );
    match telegram.skip_reason() {
        Some(reason) => writeln!(out, "   Telegram skipped: {}", reason)?,
        None => match telegram.send_test().await {
            Ok(()) => {
                summary.telegram_ok = Some(true);
                writeln!(out, "   Telegram test message sent")?;
            }
            Err(e) => {
                summary.telegram_ok = Some(false);
                writeln!(out, "   Telegram FAILED: {}", e.kind())?;
                writeln!(out, "   Hint: {}", webhook_hint(e.kind()))?;
            }
        },
    }

    writeln!(out, "\n5. Quick fixes")?;
    if !summary.api_ok {
        writeln!(out, "   - Get an API key at {}", API_KEY_URL)?;
    }
    if !summary.email_ok {
        writeln!(out, "   - Create an app password at {}", APP_PASSWORD_URL)?;
    }
    if summary.discord_ok == Some(false) {
        writeln!(out, "   - Copy a fresh URL from Server Settings > Integrations > Webhooks")?;
    }
    if summary.telegram_ok == Some(false) {
        writeln!(out, "   - Check TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID")?;
    }
    let chats_ok = summary.discord_ok != Some(false) && summary.telegram_ok != Some(false);
    if summary.api_ok && summary.email_ok && chats_ok {
        writeln!(out, "   - none needed")?;
    }

    writeln!(out, "\n6. Status")?;
    writeln!(out, "   {}", summary.verdict())?;
    Ok(summary)
}
