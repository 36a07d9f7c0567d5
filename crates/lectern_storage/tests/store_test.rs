use chrono::{Duration, NaiveDate, TimeZone, Utc};
use lectern_core::{ArtifactHeader, ArtifactSource, LessonArtifact, LessonKind, LessonRequest};
use lectern_error::StorageErrorKind;
use lectern_storage::LessonStore;
use std::time::SystemTime;

fn artifact(kind: LessonKind, title: &str) -> LessonArtifact {
    let request = LessonRequest::new(kind, title, "focus");
    let header = ArtifactHeader::for_request(
        &request,
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(),
        vec!["rust".to_string()],
        ArtifactSource::Fallback {
            reason: "test".to_string(),
        },
    );
    LessonArtifact::new(header, format!("## {title}\n\nBody."))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn set_mtime(path: &std::path::Path, when: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

#[tokio::test]
async fn daily_folder_creation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let day = date(2026, 3, 14);

    let first = store.create_daily_folder(day).await.unwrap();
    let second = store.create_daily_folder(day).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, dir.path().join("daily-lessons").join("2026-03-14"));
    assert!(first.is_dir());
}

#[tokio::test]
async fn save_names_file_by_kind_and_millis() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let lesson = artifact(LessonKind::ProTip, "Test Title");

    let path = store.save(&lesson, date(2026, 3, 14)).await.unwrap();
    let millis = lesson.header().generated().timestamp_millis();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!("pro-tip-{millis}.md")
    );

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Test Title"));
    assert_eq!(store.load(&path).await.unwrap(), lesson);
}

#[tokio::test]
async fn colliding_saves_get_distinct_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let lesson = artifact(LessonKind::Series, "Same");
    let day = date(2026, 3, 14);

    let (a, b, c) = tokio::join!(
        store.save(&lesson, day),
        store.save(&lesson, day),
        store.save(&lesson, day)
    );
    let mut paths = vec![a.unwrap(), b.unwrap(), c.unwrap()];
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 3);
}

#[tokio::test]
async fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let err = store.load(&dir.path().join("nope.md")).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::NotFound(_)));
}

#[tokio::test]
async fn empty_tree_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let since = Utc::now() - Duration::days(7);
    assert!(store.lessons_since(since).await.unwrap().is_empty());

    let stats = store.stats(Utc::now(), date(2026, 3, 14)).await.unwrap();
    assert_eq!(*stats.total_lessons(), 0);
    assert_eq!(*stats.streak_days(), 0);
}

#[tokio::test]
async fn lessons_since_filters_by_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let old = store
        .save(&artifact(LessonKind::Knowledge, "Old"), date(2026, 3, 1))
        .await
        .unwrap();
    let fresh = store
        .save(&artifact(LessonKind::Expert, "Fresh"), date(2026, 3, 14))
        .await
        .unwrap();
    set_mtime(
        &old,
        SystemTime::now() - std::time::Duration::from_secs(10 * 24 * 3600),
    );

    let week = store
        .lessons_since(Utc::now() - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(week.len(), 1);
    assert_eq!(week[0].path(), &fresh);
    assert!(week[0].name().starts_with("2026-03-14/expert-"));
}

#[tokio::test]
async fn streak_counts_consecutive_days() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    for day in [12, 13, 14] {
        store
            .save(&artifact(LessonKind::Series, "S"), date(2026, 3, day))
            .await
            .unwrap();
    }
    store
        .save(&artifact(LessonKind::Series, "S"), date(2026, 3, 10))
        .await
        .unwrap();
    // An empty folder breaks the streak.
    store.create_daily_folder(date(2026, 3, 11)).await.unwrap();

    assert_eq!(store.streak(date(2026, 3, 14)).await.unwrap(), 3);
    assert_eq!(store.streak(date(2026, 3, 15)).await.unwrap(), 0);
}

#[tokio::test]
async fn progress_report_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let today = date(2026, 3, 14);
    store
        .save(&artifact(LessonKind::Series, "S"), today)
        .await
        .unwrap();

    let (path, stats) = store.write_progress_report(Utc::now(), today).await.unwrap();
    assert_eq!(*stats.total_lessons(), 1);
    assert_eq!(*stats.recent_lessons(), 1);
    assert_eq!(*stats.streak_days(), 1);

    let report = std::fs::read_to_string(path).unwrap();
    assert!(report.contains("**Total lessons**: 1"));
    assert!(report.contains("**Streak**: 1 days"));
}

#[tokio::test]
async fn archive_moves_only_old_dated_folders() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let today = date(2026, 3, 14);
    store.create_daily_folder(date(2026, 1, 1)).await.unwrap();
    store.create_daily_folder(date(2026, 3, 1)).await.unwrap();
    std::fs::create_dir_all(store.lessons_dir().join("notes")).unwrap();

    let moved = store.archive_older_than(30, today).await.unwrap();

    assert_eq!(moved, vec![dir.path().join("archive").join("2026-01-01")]);
    assert!(store.day_dir(date(2026, 3, 1)).is_dir());
    assert!(store.lessons_dir().join("notes").is_dir());
    assert!(!store.day_dir(date(2026, 1, 1)).exists());
}

#[tokio::test]
async fn backup_copies_into_dated_folder() {
    let dir = tempfile::tempdir().unwrap();
    let store = LessonStore::new(dir.path());
    let today = date(2026, 3, 14);
    let saved = store
        .save(&artifact(LessonKind::Series, "S"), today)
        .await
        .unwrap();

    let copy = store.backup(&saved, today).await.unwrap();
    assert_eq!(
        copy,
        dir.path()
            .join("backups")
            .join("2026-03-14")
            .join(saved.file_name().unwrap())
    );
    assert_eq!(
        std::fs::read_to_string(copy).unwrap(),
        std::fs::read_to_string(saved).unwrap()
    );
}
