//! Everything a job needs, built once at startup.

use lectern_config::{ScheduleConfig, Settings};
use lectern_delivery::{FanOut, MailTransport, SmtpMailer, WeeklySummary};
use lectern_error::LecternResult;
use lectern_generator::{LearnerProfile, LessonGenerator, WelcomeStatus};
use lectern_models::{CompletionDriver, OpenRouterClient};
use lectern_storage::LessonStore;
use std::sync::Arc;

use crate::RunLog;

/// Immutable state shared by every job firing.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct DaemonContext {
    /// Resolved settings
    settings: Settings,
    /// Job table
    schedule: ScheduleConfig,
    /// Lesson files
    store: LessonStore,
    /// Prompt and fallback generation
    generator: LessonGenerator,
    /// Lesson delivery
    fan_out: FanOut,
    /// Weekly summary job
    summary: WeeklySummary,
    /// One-shot run records
    run_log: RunLog,
}

impl DaemonContext {
    /// Builds the production context: OpenRouter completions and SMTP mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule file is invalid or an HTTP client cannot be built.
    pub fn from_settings(settings: Settings) -> LecternResult<Self> {
        let schedule = ScheduleConfig::load_or_default(settings.schedule_path().as_deref())?;
        let driver: Arc<dyn CompletionDriver> = Arc::new(OpenRouterClient::new(
            settings.api_key().clone(),
            settings.api_url().clone(),
            settings.model().clone(),
        )?);
        let mailer = SmtpMailer::from_settings(&settings)
            .map(|mailer| Arc::new(mailer) as Arc<dyn MailTransport>);
        Self::with_parts(settings, schedule, driver, mailer)
    }

    /// Builds a context around the given completion driver and mail transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook HTTP client cannot be built.
    pub fn with_parts(
        settings: Settings,
        schedule: ScheduleConfig,
        driver: Arc<dyn CompletionDriver>,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> LecternResult<Self> {
        let store = LessonStore::new(settings.workdir().clone());
        let profile = LearnerProfile::new(
            settings.learning_level().clone(),
            settings.focus_areas().clone(),
            settings.preferred_language().clone(),
        );
        let generator = LessonGenerator::new(driver, profile).with_welcome_status(WelcomeStatus {
            email_ready: settings.email_configured(),
            api_ready: settings.api_configured(),
        });
        let fan_out = FanOut::from_settings(&settings, store.clone(), mailer.clone())?;
        let summary = WeeklySummary::from_settings(&settings, store.clone(), mailer);
        let run_log = RunLog::new(settings.run_log_file());
        Ok(Self {
            settings,
            schedule,
            store,
            generator,
            fan_out,
            summary,
            run_log,
        })
    }
}
