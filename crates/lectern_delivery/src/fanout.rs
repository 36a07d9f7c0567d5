//! Concurrent delivery to every sink.

use crate::backup::BackupSink;
use crate::email::EmailSink;
use crate::mail::MailTransport;
use crate::sink::Sink;
use crate::webhook::{DiscordSink, TelegramSink};
use futures::future::join_all;
use lectern_config::Settings;
use lectern_core::{DeliveryOutcome, DeliveryRecord, LessonArtifact};
use lectern_error::HttpError;
use lectern_storage::LessonStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Timeout for webhook posts.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers one artifact to a fixed set of sinks.
#[derive(Clone, Default)]
pub struct FanOut {
    sinks: Vec<Arc<dyn Sink>>,
}

impl std::fmt::Debug for FanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sinks.iter().map(|s| s.kind()))
            .finish()
    }
}

impl FanOut {
    /// Creates a fan-out over `sinks`. Records come back in this order.
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Email, Discord, Telegram and backup sinks configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook HTTP client cannot be built.
    pub fn from_settings(
        settings: &Settings,
        store: LessonStore,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build webhook client: {}", e)))?;
        let focus = settings.focus_areas().join(", ");
        Ok(Self::new(vec![
            Arc::new(EmailSink::from_settings(settings, mailer)),
            Arc::new(DiscordSink::new(
                client.clone(),
                settings.discord_webhook().clone(),
                focus.clone(),
            )),
            Arc::new(TelegramSink::new(
                client,
                settings.telegram_api_url().clone(),
                settings.telegram_bot_token().clone(),
                settings.telegram_chat_id().clone(),
                focus,
            )),
            Arc::new(BackupSink::new(
                store,
                *settings.save_backups(),
                *settings.timezone(),
            )),
        ]))
    }

    /// The sinks, in record order.
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Hands the lesson saved at `path` to every configured sink concurrently.
    ///
    /// Never fails: each sink's result is reported in its own record.
    #[instrument(skip_all, fields(title = %artifact.header().title(), path = %path.display()))]
    pub async fn deliver(&self, artifact: &LessonArtifact, path: &Path) -> Vec<DeliveryRecord> {
        let attempts = self.sinks.iter().map(|sink| async move {
            let outcome = match sink.skip_reason() {
                Some(reason) => DeliveryOutcome::skipped(reason),
                None => match sink.send(artifact, path).await {
                    Ok(()) => DeliveryOutcome::Sent,
                    Err(e) => {
                        let fallback = sink.recover(artifact, path, &e).await;
                        DeliveryOutcome::Failed {
                            error: e.kind().to_string(),
                            fallback,
                        }
                    }
                },
            };
            DeliveryRecord::new(sink.kind(), outcome)
        });
        let records = join_all(attempts).await;

        for record in &records {
            match record.outcome() {
                DeliveryOutcome::Sent => info!(sink = %record.sink(), "Delivered"),
                DeliveryOutcome::Skipped { reason } => {
                    info!(sink = %record.sink(), reason = %reason, "Skipped sink")
                }
                DeliveryOutcome::Failed { error, fallback } => warn!(
                    sink = %record.sink(),
                    error = %error,
                    fallback = ?fallback,
                    "Delivery failed"
                ),
            }
        }
        records
    }
}
