//! Discord and Telegram sinks.

use crate::render::{TELEGRAM_TEST_TEXT, discord_payload, discord_test_payload, telegram_text};
use crate::sink::Sink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_core::{LessonArtifact, SinkKind};
use lectern_error::{DeliveryError, DeliveryErrorKind};
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use tracing::instrument;

const DISCORD_WEBHOOK_PREFIXES: [&str; 2] = [
    "https://discord.com/api/webhooks/",
    "https://discordapp.com/api/webhooks/",
];

/// Whether `url` has the shape Discord gives webhook URLs.
///
/// # Examples
///
/// ```
/// use lectern_delivery::is_discord_webhook_url;
///
/// assert!(is_discord_webhook_url("https://discord.com/api/webhooks/1/abc"));
/// assert!(!is_discord_webhook_url("https://discord.com/channels/1/2"));
/// ```
pub fn is_discord_webhook_url(url: &str) -> bool {
    DISCORD_WEBHOOK_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix) && url.len() > prefix.len())
}

async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &T,
) -> Result<(), DeliveryError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| DeliveryError::new(DeliveryErrorKind::Transport(e.to_string())))?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DeliveryError::new(DeliveryErrorKind::Rejected(status.as_u16())))
    }
}

/// Posts an embed to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordSink {
    client: Client,
    webhook: Option<String>,
    focus_areas: String,
}

impl DiscordSink {
    /// Creates the sink; `None` disables it.
    pub fn new(client: Client, webhook: Option<String>, focus_areas: impl Into<String>) -> Self {
        Self {
            client,
            webhook,
            focus_areas: focus_areas.into(),
        }
    }

    /// The configured webhook URL.
    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }

    fn url(&self) -> Result<&str, DeliveryError> {
        self.webhook.as_deref().ok_or_else(|| {
            DeliveryError::new(DeliveryErrorKind::Transport("webhook not configured".to_string()))
        })
    }

    /// Posts a connection test embed.
    ///
    /// # Errors
    ///
    /// Returns an error if no webhook is set, the request fails, or Discord
    /// rejects the payload.
    #[instrument(skip_all)]
    pub async fn send_test(&self, now: DateTime<Utc>) -> Result<(), DeliveryError> {
        post_json(&self.client, self.url()?, &discord_test_payload(now)).await
    }
}

#[async_trait]
impl Sink for DiscordSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Discord
    }

    fn skip_reason(&self) -> Option<String> {
        self.webhook
            .is_none()
            .then(|| "DISCORD_WEBHOOK not set".to_string())
    }

    #[instrument(skip_all)]
    async fn send(&self, artifact: &LessonArtifact, _path: &Path) -> Result<(), DeliveryError> {
        post_json(&self.client, self.url()?, &discord_payload(artifact, &self.focus_areas)).await
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Sends a Markdown message through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramSink {
    client: Client,
    api_url: String,
    token: Option<String>,
    chat_id: Option<String>,
    focus_areas: String,
}

impl std::fmt::Debug for TelegramSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink")
            .field("api_url", &self.api_url)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramSink {
    /// Creates the sink; it is skipped unless both token and chat id are set.
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        token: Option<String>,
        chat_id: Option<String>,
        focus_areas: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token,
            chat_id,
            focus_areas: focus_areas.into(),
        }
    }

    async fn send_message(&self, text: String) -> Result<(), DeliveryError> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            return Err(DeliveryError::new(DeliveryErrorKind::Transport(
                "bot not configured".to_string(),
            )));
        };
        let url = format!("{}/bot{}/sendMessage", self.api_url.trim_end_matches('/'), token);
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };
        post_json(&self.client, &url, &body).await
    }

    /// Sends a connection test message.
    ///
    /// # Errors
    ///
    /// Returns an error if the bot is not configured, the request fails, or
    /// Telegram rejects the message.
    #[instrument(skip_all)]
    pub async fn send_test(&self) -> Result<(), DeliveryError> {
        self.send_message(TELEGRAM_TEST_TEXT.to_string()).await
    }
}

#[async_trait]
impl Sink for TelegramSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Telegram
    }

    fn skip_reason(&self) -> Option<String> {
        match (&self.token, &self.chat_id) {
            (Some(_), Some(_)) => None,
            _ => Some("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set".to_string()),
        }
    }

    #[instrument(skip_all)]
    async fn send(&self, artifact: &LessonArtifact, _path: &Path) -> Result<(), DeliveryError> {
        self.send_message(telegram_text(artifact, &self.focus_areas))
            .await
    }
}
