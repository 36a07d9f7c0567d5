//! The interactive setup wizard and first-run initialization.

use chrono::Utc;
use chrono_tz::Tz;
use lectern_config::{SetupAnswers, Settings, validate_api_key};
use lectern_core::{LessonKind, LessonRequest};
use lectern_error::{ConfigError, LecternResult};
use lectern_server::DaemonContext;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const API_KEY_PLACEHOLDER: &str = "your_api_key_here";
const APP_PASSWORD_PLACEHOLDER: &str = "your_app_password_here";
const DEFAULT_FOCUS_AREAS: &str = "playwright,cucumber,api-testing";
const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Folders created under the working directory.
pub const DIRECTORIES: [&str; 4] = ["daily-lessons", "logs", "archive", "backups"];

/// Prompts on `output` and reads answers from `input`.
#[derive(Debug)]
pub struct SetupWizard<R, W> {
    input: R,
    output: W,
}

fn config_io(e: std::io::Error) -> ConfigError {
    ConfigError::new(format!("Setup wizard I/O failed: {}", e))
}

impl<R: BufRead, W: Write> SetupWizard<R, W> {
    /// Creates a wizard over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, ConfigError> {
        write!(self.output, "{}", prompt).map_err(config_io)?;
        self.output.flush().map_err(config_io)?;
        let mut line = String::new();
        self.input.read_line(&mut line).map_err(config_io)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, text: &str) -> Result<(), ConfigError> {
        writeln!(self.output, "{}", text).map_err(config_io)
    }

    fn yes(&mut self, prompt: &str) -> Result<bool, ConfigError> {
        Ok(self.ask(prompt)?.to_ascii_lowercase().starts_with('y'))
    }

    /// Walks through every question.
    ///
    /// `current_timezone` is offered as the default timezone; pass `None` to
    /// default to America/New_York.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn collect(&mut self, current_timezone: Option<&str>) -> Result<SetupAnswers, ConfigError> {
        self.say("Lectern setup\n")?;

        self.say("Step 1: completion API (keys at https://openrouter.ai/)")?;
        let api_key = if self.yes("Do you have an OpenRouter API key? (y/n): ")? {
            let key = self.ask("API key: ")?;
            if let Err(e) = validate_api_key(&key) {
                self.say(&format!("Warning: {}", e.message))?;
            }
            key
        } else {
            self.say("Lessons will come from the built-in library until a key is added.")?;
            API_KEY_PLACEHOLDER.to_string()
        };

        self.say("\nStep 2: email")?;
        let email_user = self.ask("Your email address: ")?;
        self.say("Gmail needs an app password: https://myaccount.google.com/apppasswords")?;
        let email_app_password = if self.yes("Do you have an app password ready? (y/n): ")? {
            self.ask("App password: ")?
        } else {
            self.say("Add EMAIL_APP_PASSWORD to the env file later.")?;
            APP_PASSWORD_PLACEHOLDER.to_string()
        };

        self.say("\nStep 3: learning preferences")?;
        self.say("1. Beginner\n2. Intermediate\n3. Advanced\n4. Expert")?;
        let learning_level = match self.ask("Select level (1-4): ")?.as_str() {
            "1" => "beginner",
            "3" => "advanced",
            "4" => "expert",
            _ => "intermediate",
        };

        self.say("Options: playwright, cucumber, api-testing, browser-automation, ai-integration")?;
        let focus = self.ask("Focus areas (comma-separated): ")?;
        let focus_areas = if focus.is_empty() {
            DEFAULT_FOCUS_AREAS.to_string()
        } else {
            focus
        };

        self.say("1. JavaScript\n2. TypeScript\n3. Both")?;
        let preferred_language = match self.ask("Select language (1-3): ")?.as_str() {
            "2" => "typescript",
            "3" => "javascript,typescript",
            _ => "javascript",
        };

        let default_tz = current_timezone.unwrap_or(DEFAULT_TIMEZONE).to_string();
        let answer = self.ask(&format!("Timezone [{}]: ", default_tz))?;
        let timezone = if answer.is_empty() {
            default_tz
        } else if answer.parse::<Tz>().is_ok() {
            answer
        } else {
            self.say(&format!("Unknown timezone '{}', using {}", answer, default_tz))?;
            default_tz
        };

        SetupAnswers::builder()
            .api_key(api_key)
            .notification_email(email_user.clone())
            .email_user(email_user)
            .email_app_password(email_app_password)
            .learning_level(learning_level)
            .focus_areas(focus_areas)
            .preferred_language(preferred_language)
            .timezone(timezone)
            .build()
            .map_err(|e| ConfigError::new(format!("Incomplete setup answers: {}", e)))
    }
}

/// Creates the working folders and saves a welcome lesson.
///
/// Returns the welcome lesson's path. Nothing is delivered.
///
/// # Errors
///
/// Returns an error if a folder cannot be created or the lesson cannot be saved.
pub async fn initialize(ctx: &DaemonContext) -> LecternResult<PathBuf> {
    let workdir = ctx.settings().workdir();
    for dir in DIRECTORIES {
        let path = workdir.join(dir);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ConfigError::new(format!("Failed to create {}: {}", path.display(), e)))?;
    }
    let request = LessonRequest::new(
        LessonKind::Welcome,
        "Welcome to Your Learning Journey",
        "onboarding",
    );
    let artifact = ctx.generator().generate_at(&request, Utc::now()).await;
    let path = ctx.store().save(&artifact, ctx.settings().today()).await?;
    tracing::info!(path = %path.display(), "Saved welcome lesson");
    Ok(path)
}

/// The timezone to offer as the wizard default.
pub fn current_timezone(settings: Option<&Settings>) -> Option<String> {
    settings.map(|s| s.timezone().name().to_string())
}
