//! The weekly summary job.

use crate::mail::{MailMessage, MailTransport};
use crate::render::{weekly_summary_html, weekly_summary_markdown};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lectern_core::DeliveryOutcome;
use lectern_error::{DeliveryError, DeliveryErrorKind, StorageError};
use lectern_storage::{LessonEntry, LessonStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

const WINDOW_DAYS: i64 = 7;
const CONCEPTS_PER_LESSON: usize = 3;

/// Result of one summary run.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct WeeklySummaryReport {
    /// Lessons modified in the trailing seven days
    lessons: Vec<LessonEntry>,
    /// Estimated concepts covered
    concepts: usize,
    /// Markdown copy in today's folder
    document: PathBuf,
    /// What happened to the email
    email: DeliveryOutcome,
}

/// Summarizes the trailing week of lessons.
#[derive(Clone)]
pub struct WeeklySummary {
    store: LessonStore,
    mail: Option<(Arc<dyn MailTransport>, String, String)>,
}

impl std::fmt::Debug for WeeklySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeeklySummary")
            .field("store", &self.store)
            .field("email", &self.mail.is_some())
            .finish()
    }
}

impl WeeklySummary {
    /// A summary that only writes the markdown copy.
    pub fn new(store: LessonStore) -> Self {
        Self { store, mail: None }
    }

    /// Also mails the summary from `from` to `to`.
    pub fn with_mail(
        mut self,
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.mail = Some((transport, from.into(), to.into()));
        self
    }

    /// Builds the summary from settings, mailing it when email is configured.
    pub fn from_settings(
        settings: &lectern_config::Settings,
        store: LessonStore,
        transport: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        let summary = Self::new(store);
        match (transport, settings.email_user(), settings.recipient()) {
            (Some(transport), Some(from), Some(to)) if settings.email_configured() => {
                summary.with_mail(transport, from.clone(), to)
            }
            _ => summary,
        }
    }

    /// Collects the week, writes `weekly-summary.md` into `today`'s folder and mails it.
    ///
    /// An empty week is a normal summary with zero lessons.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lesson tree cannot be read or the copy cannot be written.
    /// Mail failures are reported in [`WeeklySummaryReport::email`].
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<WeeklySummaryReport, StorageError> {
        let lessons = self
            .store
            .lessons_since(now - Duration::days(WINDOW_DAYS))
            .await?;
        let concepts = lessons.len() * CONCEPTS_PER_LESSON;
        let document = self
            .store
            .write_document(today, "weekly-summary.md", &weekly_summary_markdown(&lessons, now))
            .await?;

        let email = match &self.mail {
            None => DeliveryOutcome::skipped("email not configured"),
            Some((transport, from, to)) => {
                match send_summary(transport.as_ref(), from, to, &lessons, now).await {
                    Ok(()) => DeliveryOutcome::Sent,
                    Err(e) => {
                        tracing::warn!(error = %e.kind(), "Weekly summary email failed");
                        DeliveryOutcome::failed(e.kind())
                    }
                }
            }
        };

        tracing::info!(lessons = lessons.len(), concepts, "Weekly summary complete");
        Ok(WeeklySummaryReport {
            lessons,
            concepts,
            document,
            email,
        })
    }
}

async fn send_summary(
    transport: &dyn MailTransport,
    from: &str,
    to: &str,
    lessons: &[LessonEntry],
    now: DateTime<Utc>,
) -> Result<(), DeliveryError> {
    let message = MailMessage::builder()
        .from(from)
        .to(to)
        .subject("Weekly Learning Progress Summary")
        .html(weekly_summary_html(lessons, now))
        .build()
        .map_err(|e| DeliveryError::new(DeliveryErrorKind::MessageBuild(e.to_string())))?;
    transport.send(&message).await
}
