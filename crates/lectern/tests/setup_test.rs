//! Setup wizard and first-run initialization tests.

use async_trait::async_trait;
use lectern::setup::{DIRECTORIES, SetupWizard, initialize};
use lectern::{
    CompletionDriver, CompletionParams, DaemonContext, EnvFile, GenerationError,
    GenerationErrorKind, ScheduleConfig, Settings,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

struct OfflineDriver;

#[async_trait]
impl CompletionDriver for OfflineDriver {
    async fn complete(
        &self,
        _prompt: &str,
        _params: CompletionParams,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::new(GenerationErrorKind::MissingApiKey))
    }

    fn model_name(&self) -> &str {
        "test/model"
    }
}

fn run_wizard(input: &str, current_tz: Option<&str>) -> (lectern::SetupAnswers, String) {
    let mut output = Vec::new();
    let answers = {
        let mut wizard = SetupWizard::new(Cursor::new(input.to_string()), &mut output);
        wizard.collect(current_tz).unwrap()
    };
    (answers, String::from_utf8(output).unwrap())
}

#[test]
fn wizard_collects_full_answers() {
    let input = "y\nsk-or-v1-abc123\nme@example.com\ny\nabcd efgh ijkl mnop\n3\nplaywright,api-testing\n2\nEurope/Berlin\n";
    let (answers, output) = run_wizard(input, None);

    assert_eq!(answers.api_key(), "sk-or-v1-abc123");
    assert_eq!(answers.email_user(), "me@example.com");
    assert_eq!(answers.notification_email(), "me@example.com");
    assert_eq!(answers.email_app_password(), "abcd efgh ijkl mnop");
    assert_eq!(answers.learning_level(), "advanced");
    assert_eq!(answers.focus_areas(), "playwright,api-testing");
    assert_eq!(answers.preferred_language(), "typescript");
    assert_eq!(answers.timezone(), "Europe/Berlin");
    assert!(!output.contains("Warning"));
}

#[test]
fn wizard_uses_placeholders_and_defaults() {
    let input = "n\nme@example.com\nn\n\n\n\n\n";
    let (answers, _) = run_wizard(input, None);

    assert_eq!(answers.api_key(), "your_api_key_here");
    assert_eq!(answers.email_app_password(), "your_app_password_here");
    assert_eq!(answers.learning_level(), "intermediate");
    assert_eq!(answers.focus_areas(), "playwright,cucumber,api-testing");
    assert_eq!(answers.preferred_language(), "javascript");
    assert_eq!(answers.timezone(), "America/New_York");
}

#[test]
fn wizard_warns_on_malformed_key_and_keeps_it() {
    let input = "y\nsk-wrong\nme@example.com\nn\n1\n\n3\n\n";
    let (answers, output) = run_wizard(input, Some("Asia/Tokyo"));

    assert_eq!(answers.api_key(), "sk-wrong");
    assert!(output.contains("Warning: Invalid API key format"));
    assert_eq!(answers.learning_level(), "beginner");
    assert_eq!(answers.preferred_language(), "javascript,typescript");
    assert_eq!(answers.timezone(), "Asia/Tokyo");
}

#[test]
fn wizard_rejects_unknown_timezone() {
    let input = "n\nme@example.com\nn\n2\n\n1\nMars/Olympus\n";
    let (answers, output) = run_wizard(input, None);

    assert_eq!(answers.timezone(), "America/New_York");
    assert!(output.contains("Unknown timezone 'Mars/Olympus'"));
}

#[test]
fn answers_round_trip_through_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join(".env");
    let input = "n\nme@example.com\ny\nabcd efgh ijkl mnop\n4\ncucumber\n1\nUTC\n";
    let (answers, _) = run_wizard(input, None);

    EnvFile::new(&env).write_answers(&answers).unwrap();
    let settings = Settings::load(dir.path(), &env).unwrap();

    assert!(!settings.api_configured());
    assert!(settings.email_configured());
    assert!(settings.app_password_well_formed());
    assert_eq!(settings.learning_level(), "expert");
    assert_eq!(settings.focus_areas(), &vec!["cucumber".to_string()]);
    assert_eq!(settings.timezone().name(), "UTC");
    assert!(*settings.auto_generate());
}

#[tokio::test]
async fn initialize_creates_folders_and_welcome_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let map: HashMap<String, String> = [("LEARNING_TIMEZONE", "UTC")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let settings = Settings::from_map(dir.path(), &map).unwrap();
    let ctx = DaemonContext::with_parts(
        settings,
        ScheduleConfig::default(),
        Arc::new(OfflineDriver),
        None,
    )
    .unwrap();

    let path = initialize(&ctx).await.unwrap();

    for name in DIRECTORIES {
        assert!(dir.path().join(name).is_dir(), "{} missing", name);
    }
    assert!(path.starts_with(dir.path().join("daily-lessons")));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Welcome to Your Learning Journey"));
    assert!(content.contains("System Status: Setup In Progress"));
}
