//! Email sink.

use crate::mail::{MailAttachment, MailMessage, MailTransport};
use crate::render::{desktop_notice, email_html};
use crate::sink::Sink;
use async_trait::async_trait;
use chrono::Utc;
use lectern_core::{LessonArtifact, SinkKind};
use lectern_error::{DeliveryError, DeliveryErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mails the lesson as an HTML preview with the file attached.
///
/// When sending fails, a plaintext notice is written to the desktop fallback path.
#[derive(Clone)]
pub struct EmailSink {
    transport: Option<Arc<dyn MailTransport>>,
    from: String,
    to: String,
    desktop_path: PathBuf,
}

impl std::fmt::Debug for EmailSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSink")
            .field("configured", &self.transport.is_some())
            .field("from", &self.from)
            .field("to", &self.to)
            .field("desktop_path", &self.desktop_path)
            .finish()
    }
}

impl EmailSink {
    /// A configured sink.
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        to: impl Into<String>,
        desktop_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport: Some(transport),
            from: from.into(),
            to: to.into(),
            desktop_path: desktop_path.into(),
        }
    }

    /// A sink that always skips.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: String::new(),
            to: String::new(),
            desktop_path: PathBuf::new(),
        }
    }

    /// Builds the sink from settings, using `transport` when email is configured.
    pub fn from_settings(
        settings: &lectern_config::Settings,
        transport: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        match (transport, settings.email_user(), settings.recipient()) {
            (Some(transport), Some(from), Some(to)) if settings.email_configured() => Self::new(
                transport,
                from.clone(),
                to,
                settings.desktop_notification_path().clone(),
            ),
            _ => Self::disabled(),
        }
    }

    async fn message(&self, artifact: &LessonArtifact, path: &Path) -> Result<MailMessage, DeliveryError> {
        let body = tokio::fs::read(path).await?;
        MailMessage::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("{} - Your Daily Learning is Ready!", artifact.header().title()))
            .html(email_html(artifact, path))
            .attachment(Some(MailAttachment {
                file_name: "lesson.md".to_string(),
                content_type: "text/markdown; charset=utf-8".to_string(),
                body,
            }))
            .build()
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::MessageBuild(e.to_string())))
    }
}

#[async_trait]
impl Sink for EmailSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Email
    }

    fn skip_reason(&self) -> Option<String> {
        if self.transport.is_none() {
            Some("EMAIL_USER or EMAIL_APP_PASSWORD not set".to_string())
        } else {
            None
        }
    }

    async fn send(&self, artifact: &LessonArtifact, path: &Path) -> Result<(), DeliveryError> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            DeliveryError::new(DeliveryErrorKind::Smtp("email is not configured".to_string()))
        })?;
        let message = self.message(artifact, path).await?;
        transport.send(&message).await
    }

    async fn recover(
        &self,
        artifact: &LessonArtifact,
        path: &Path,
        error: &DeliveryError,
    ) -> Option<PathBuf> {
        let notice = desktop_notice(artifact, path, &error.kind().to_string(), Utc::now());
        if let Some(parent) = self.desktop_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(path = %parent.display(), error = %e, "Cannot create fallback directory");
                return None;
            }
        }
        match tokio::fs::write(&self.desktop_path, notice).await {
            Ok(()) => {
                tracing::info!(path = %self.desktop_path.display(), "Wrote desktop fallback notice");
                Some(self.desktop_path.clone())
            }
            Err(e) => {
                tracing::warn!(path = %self.desktop_path.display(), error = %e, "Cannot write fallback notice");
                None
            }
        }
    }
}
