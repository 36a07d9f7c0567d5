//! The generate, save, deliver pipeline.

use crate::{DaemonContext, RunRecord};
use chrono::Utc;
use lectern_config::{JobAction, JobSpec};
use lectern_core::{DeliveryRecord, LessonArtifact, LessonKind, LessonRequest, SinkKind};
use lectern_delivery::WeeklySummaryReport;
use lectern_error::{LecternResult, StorageError};
use std::path::PathBuf;
use tracing::{info, instrument};

const WELCOME_TITLE: &str = "Welcome to Lectern";

/// A lesson that was generated, saved and handed to the sinks.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct LessonRun {
    /// The artifact
    artifact: LessonArtifact,
    /// Where it was saved
    path: PathBuf,
    /// Per-sink outcomes
    deliveries: Vec<DeliveryRecord>,
}

/// What one job firing produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    /// A lesson job
    Lesson(LessonRun),
    /// The weekly summary
    Summary(WeeklySummaryReport),
}

/// Generates `request`, saves it under today's folder and delivers it.
///
/// Generation never fails. Only a failed save is an error; delivery problems
/// come back as records.
///
/// # Errors
///
/// Returns an error if the lesson file cannot be written.
#[instrument(skip(ctx, request), fields(kind = %request.kind(), title = %request.title()))]
pub async fn run_lesson(
    ctx: &DaemonContext,
    request: &LessonRequest,
) -> Result<LessonRun, StorageError> {
    let artifact = ctx.generator().generate(request).await;
    let date = artifact
        .header()
        .generated()
        .with_timezone(ctx.settings().timezone())
        .date_naive();
    let path = ctx.store().save(&artifact, date).await?;
    let deliveries = ctx.fan_out().deliver(&artifact, &path).await;
    info!(
        path = %path.display(),
        source = %artifact.header().source(),
        sent = deliveries.iter().filter(|d| d.outcome().is_sent()).count(),
        "Lesson pipeline complete"
    );
    Ok(LessonRun {
        artifact,
        path,
        deliveries,
    })
}

/// Runs the weekly summary for today.
///
/// # Errors
///
/// Returns an error if the lesson tree cannot be read or the copy cannot be written.
pub async fn run_weekly_summary(ctx: &DaemonContext) -> Result<WeeklySummaryReport, StorageError> {
    ctx.summary().run(Utc::now(), ctx.settings().today()).await
}

/// Runs whatever `action` asks for.
///
/// # Errors
///
/// See [`run_lesson`] and [`run_weekly_summary`].
pub async fn run_action(ctx: &DaemonContext, action: &JobAction) -> LecternResult<JobReport> {
    match action.request() {
        Some(request) => Ok(JobReport::Lesson(run_lesson(ctx, &request).await?)),
        None => Ok(JobReport::Summary(run_weekly_summary(ctx).await?)),
    }
}

/// Runs one scheduled job.
///
/// # Errors
///
/// See [`run_action`].
#[instrument(skip(ctx, job), fields(job = %job.name()))]
pub async fn run_job(ctx: &DaemonContext, job: &JobSpec) -> LecternResult<JobReport> {
    run_action(ctx, job.action()).await
}

/// Writes the welcome lesson when enabled and today has no lessons yet.
///
/// # Errors
///
/// Returns an error if the lesson tree cannot be read or the lesson cannot be saved.
pub async fn ensure_welcome(ctx: &DaemonContext) -> Result<Option<LessonRun>, StorageError> {
    if !*ctx.settings().auto_generate() {
        return Ok(None);
    }
    if ctx.store().day_has_lessons(ctx.settings().today()).await? {
        return Ok(None);
    }
    info!("First start today, writing welcome lesson");
    let request = LessonRequest::new(LessonKind::Welcome, WELCOME_TITLE, "onboarding");
    run_lesson(ctx, &request).await.map(Some)
}

/// The action `generate <kind>` runs.
///
/// `weekly-summary` selects the summary. A lesson kind takes its title and
/// focus from the first scheduled job of that kind, with `title` overriding.
pub fn action_for(ctx: &DaemonContext, kind: &str, title: Option<String>) -> JobAction {
    if kind == "weekly-summary" {
        return JobAction::WeeklySummary;
    }
    let Ok(kind) = kind.parse::<LessonKind>();
    let scheduled = ctx.schedule().jobs().iter().find_map(|job| match job.action() {
        JobAction::Lesson {
            kind: k,
            title,
            focus,
        } if *k == kind => Some((title.clone(), focus.clone())),
        _ => None,
    });
    let (default_title, focus) =
        scheduled.unwrap_or_else(|| (default_title(&kind), kind.to_string()));
    JobAction::Lesson {
        kind,
        title: title.unwrap_or(default_title),
        focus,
    }
}

fn default_title(kind: &LessonKind) -> String {
    match kind {
        LessonKind::Welcome => WELCOME_TITLE.to_string(),
        other => format!("Daily {} lesson", other),
    }
}

/// Runs `action` once and appends the outcome to the run log.
///
/// # Errors
///
/// Returns an error only if the run log cannot be written; pipeline failures
/// are recorded with `success: false`.
pub async fn run_once(ctx: &DaemonContext, action: &JobAction) -> Result<RunRecord, StorageError> {
    let job = match action {
        JobAction::Lesson { kind, .. } => kind.to_string(),
        JobAction::WeeklySummary => "weekly-summary".to_string(),
    };
    let record = RunRecord::new(job, Utc::now());
    let record = match run_action(ctx, action).await {
        Ok(JobReport::Lesson(run)) => record.lesson(
            run.artifact.header().title(),
            run.path,
            run.artifact.header().source().to_string(),
            run.deliveries,
        ),
        Ok(JobReport::Summary(report)) => record.summary(
            report.document().clone(),
            report.lessons().len(),
            DeliveryRecord::new(SinkKind::Email, report.email().clone()),
        ),
        Err(e) => {
            tracing::error!(error = %e, "One-shot run failed");
            record.failed(e)
        }
    };
    ctx.run_log().append(&record).await?;
    Ok(record)
}
