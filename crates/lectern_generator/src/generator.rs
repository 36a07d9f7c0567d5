//! The lesson generator.

use crate::profile::LearnerProfile;
use crate::progression::{ProgressionContext, START_DATE};
use crate::templates::{WelcomeStatus, fallback_body, render_prompt};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use lectern_core::{ArtifactHeader, ArtifactSource, LessonArtifact, LessonKind, LessonRequest};
use lectern_models::{CompletionDriver, CompletionParams};
use rand::Rng;
use std::sync::Arc;
use tracing::instrument;

/// Turns lesson requests into artifacts.
///
/// Remote failures never escape: [`LessonGenerator::generate`] substitutes the
/// canned lesson for the request's kind and records why in the artifact source.
#[derive(Clone)]
pub struct LessonGenerator {
    driver: Arc<dyn CompletionDriver>,
    profile: LearnerProfile,
    start_date: NaiveDate,
    welcome_status: WelcomeStatus,
    params: CompletionParams,
}

impl std::fmt::Debug for LessonGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonGenerator")
            .field("model", &self.driver.model_name())
            .field("profile", &self.profile)
            .field("start_date", &self.start_date)
            .field("welcome_status", &self.welcome_status)
            .finish()
    }
}

impl LessonGenerator {
    /// Creates a generator over `driver`.
    pub fn new(driver: Arc<dyn CompletionDriver>, profile: LearnerProfile) -> Self {
        Self {
            driver,
            profile,
            start_date: START_DATE,
            welcome_status: WelcomeStatus::default(),
            params: CompletionParams::LESSON,
        }
    }

    /// Sets the configuration status shown in the welcome lesson.
    pub fn with_welcome_status(mut self, status: WelcomeStatus) -> Self {
        self.welcome_status = status;
        self
    }

    /// Moves day zero of the progression context.
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// The learner profile.
    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    /// Generates a lesson stamped with the current time.
    pub async fn generate(&self, request: &LessonRequest) -> LessonArtifact {
        self.generate_at(request, Utc::now()).await
    }

    /// Generates a lesson stamped with `now`.
    ///
    /// The welcome kind never calls the driver.
    #[instrument(skip(self, request), fields(kind = %request.kind(), title = %request.title()))]
    pub async fn generate_at(&self, request: &LessonRequest, now: DateTime<Utc>) -> LessonArtifact {
        let (body, source) = if *request.kind() == LessonKind::Welcome {
            (
                fallback_body(request.kind(), request.title(), self.welcome_status),
                ArtifactSource::Fallback {
                    reason: "welcome lesson".to_string(),
                },
            )
        } else {
            let prompt = self.build_prompt(request, now);
            match self.driver.complete(&prompt, self.params).await {
                Ok(content) => {
                    tracing::info!(
                        model = self.driver.model_name(),
                        chars = content.len(),
                        "Generated lesson"
                    );
                    (
                        content,
                        ArtifactSource::Remote {
                            model: self.driver.model_name().to_string(),
                        },
                    )
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e.kind(),
                        transient = e.kind().is_transient(),
                        "Generation failed, using fallback lesson"
                    );
                    (
                        fallback_body(request.kind(), request.title(), self.welcome_status),
                        ArtifactSource::Fallback {
                            reason: e.kind().to_string(),
                        },
                    )
                }
            }
        };

        let header = ArtifactHeader::for_request(
            request,
            now,
            self.profile.focus_areas().clone(),
            source,
        );
        LessonArtifact::new(header, body)
    }

    /// The full prompt for `request`: template, learner block, and rotating context.
    pub fn build_prompt(&self, request: &LessonRequest, now: DateTime<Utc>) -> String {
        let context =
            ProgressionContext::for_day(self.start_date, now.date_naive(), now.timestamp_millis());
        let seed: u32 = rand::thread_rng().gen_range(0..10_000);
        format!(
            "{}\n\n{}\n\nDay of year: {}\nVariation seed: {}\n\n{}",
            render_prompt(request.kind(), request.focus()),
            self.profile.render(),
            now.ordinal(),
            seed,
            context.render(),
        )
    }
}
