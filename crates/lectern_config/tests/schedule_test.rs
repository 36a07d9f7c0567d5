use lectern_config::{JobAction, ScheduleConfig, normalize_cron};
use lectern_core::LessonKind;

#[test]
fn default_schedule_is_valid() {
    let schedule = ScheduleConfig::default();
    schedule.validate().unwrap();
    assert_eq!(schedule.jobs().len(), 7);

    let lesson_hours: Vec<&str> = schedule
        .jobs()
        .iter()
        .filter(|j| matches!(j.action(), JobAction::Lesson { .. }))
        .map(|j| j.cron().as_str())
        .collect();
    assert_eq!(
        lesson_hours,
        vec!["0 7 * * *", "0 8 * * *", "0 13 * * *", "0 15 * * *", "0 17 * * *", "0 9 1 * *"]
    );

    let summary = schedule.job("weekly-summary").unwrap();
    assert_eq!(summary.action(), &JobAction::WeeklySummary);
    assert_eq!(summary.normalized_cron().unwrap(), "0 0 18 * * Sun");
}

#[test]
fn toml_schedule_parses() {
    let toml = r#"
[[jobs]]
name = "lunch"
cron = "30 12 * * 1-5"
action = "lesson"
kind = "pro-tip"
title = "Lunch Tip"

[[jobs]]
name = "summary"
cron = "0 0 20 * * Sat"
action = "weekly-summary"
"#;
    let schedule = ScheduleConfig::from_toml_str(toml).unwrap();
    let lunch = schedule.job("lunch").unwrap();
    let request = lunch.action().request().unwrap();
    assert_eq!(request.kind(), &LessonKind::ProTip);
    assert_eq!(request.title(), "Lunch Tip");
    assert_eq!(request.focus(), "");
    assert!(schedule.job("summary").unwrap().action().request().is_none());
}

#[test]
fn invalid_cron_is_rejected() {
    let toml = r#"
[[jobs]]
name = "broken"
cron = "99 * * * *"
action = "weekly-summary"
"#;
    let err = ScheduleConfig::from_toml_str(toml).unwrap_err();
    assert!(err.message.contains("broken"));
}

#[test]
fn duplicate_names_are_rejected() {
    let toml = r#"
[[jobs]]
name = "twice"
cron = "0 7 * * *"
action = "weekly-summary"

[[jobs]]
name = "twice"
cron = "0 8 * * *"
action = "weekly-summary"
"#;
    assert!(ScheduleConfig::from_toml_str(toml).is_err());
}

#[test]
fn empty_schedule_is_rejected() {
    assert!(ScheduleConfig::from_toml_str("").is_err());
}

#[test]
fn weekday_numbers_map_to_names() {
    assert_eq!(normalize_cron("0 18 * * 7").unwrap(), "0 0 18 * * Sun");
    assert_eq!(normalize_cron("0 18 * * 1,3,5").unwrap(), "0 0 18 * * Mon,Wed,Fri");
    assert_eq!(normalize_cron("0 18 * * */2").unwrap(), "0 0 18 * * */2");
    assert!(normalize_cron("0 18 * * 8").is_err());
    assert!(normalize_cron("* *").is_err());
}

#[test]
fn schedule_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.toml");
    std::fs::write(
        &path,
        "[[jobs]]\nname = \"one\"\ncron = \"0 6 * * *\"\naction = \"weekly-summary\"\n",
    )
    .unwrap();
    let schedule = ScheduleConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(schedule.jobs().len(), 1);
    assert_eq!(ScheduleConfig::load_or_default(None).unwrap(), ScheduleConfig::default());
}
