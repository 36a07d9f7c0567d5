//! One-shot lesson command handlers.

use chrono::Utc;
use lectern::pipeline::{action_for, run_once};
use lectern::{DaemonContext, DeliveryOutcome, LecternResult, RunRecord, Settings};

fn print_record(record: &RunRecord) {
    if let Some(title) = record.title() {
        println!("Lesson: {}", title);
    }
    if let Some(path) = record.path() {
        println!("Saved: {}", path.display());
    }
    if let Some(source) = record.source() {
        println!("Source: {}", source);
    }
    if let Some(lessons) = record.lessons() {
        println!("Lessons this week: {}", lessons);
    }
    for delivery in record.deliveries() {
        match delivery.outcome() {
            DeliveryOutcome::Sent => println!("  {}: sent", delivery.sink()),
            DeliveryOutcome::Skipped { reason } => {
                println!("  {}: skipped ({})", delivery.sink(), reason)
            }
            DeliveryOutcome::Failed { error, fallback } => match fallback {
                Some(path) => println!(
                    "  {}: failed ({}), notice written to {}",
                    delivery.sink(),
                    error,
                    path.display()
                ),
                None => println!("  {}: failed ({})", delivery.sink(), error),
            },
        }
    }
    if let Some(error) = record.error() {
        println!("Error: {}", error);
    }
}

/// Handle the `generate` command.
///
/// Returns whether the run succeeded.
pub async fn handle_generate(
    settings: Settings,
    kind: &str,
    title: Option<String>,
) -> LecternResult<bool> {
    let ctx = DaemonContext::from_settings(settings)?;
    let action = action_for(&ctx, kind, title);
    let record = run_once(&ctx, &action).await?;
    print_record(&record);
    Ok(*record.success())
}

/// Handle the `report` command
pub async fn handle_report(settings: &Settings) -> LecternResult<()> {
    let store = lectern::LessonStore::new(settings.workdir().clone());
    let (path, stats) = store
        .write_progress_report(Utc::now(), settings.today())
        .await?;
    println!("Total lessons: {}", stats.total_lessons());
    println!("Last 30 days: {}", stats.recent_lessons());
    println!("Streak: {} days", stats.streak_days());
    println!("Weekly average: {}", stats.weekly_average());
    println!("Report written to {}", path.display());
    Ok(())
}

/// Handle the `archive` command
pub async fn handle_archive(settings: &Settings, days: i64) -> LecternResult<()> {
    let store = lectern::LessonStore::new(settings.workdir().clone());
    let moved = store.archive_older_than(days, settings.today()).await?;
    if moved.is_empty() {
        println!("Nothing older than {} days.", days);
    } else {
        for path in &moved {
            println!("Archived {}", path.display());
        }
    }
    Ok(())
}
