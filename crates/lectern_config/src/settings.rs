//! Runtime settings.

use chrono_tz::Tz;
use lectern_error::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default completion endpoint.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "google/gemma-2-9b-it:free";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEZONE: &str = "America/New_York";
const DEFAULT_FOCUS_AREAS: &str = "playwright,cucumber,api-testing";
const DESKTOP_NOTIFICATION_FILE: &str = "Lectern-Notification.txt";

/// Every key the settings layer reads from the env file or process environment.
pub const KNOWN_KEYS: &[&str] = &[
    "OPENROUTER_API_KEY",
    "OPENROUTER_API_URL",
    "OPENROUTER_MODEL",
    "EMAIL_USER",
    "EMAIL_APP_PASSWORD",
    "NOTIFICATION_EMAIL",
    "SMTP_HOST",
    "DISCORD_WEBHOOK",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_API_URL",
    "LEARNING_LEVEL",
    "FOCUS_AREAS",
    "PREFERRED_LANGUAGE",
    "LEARNING_TIMEZONE",
    "DEBUG_MODE",
    "AUTO_GENERATE",
    "SAVE_BACKUPS",
    "DESKTOP_NOTIFICATION_PATH",
    "LECTERN_SCHEDULE",
];

/// Whether a configured value is empty or still the setup wizard's placeholder.
///
/// # Examples
///
/// ```
/// use lectern_config::is_placeholder;
///
/// assert!(is_placeholder("your_api_key_here"));
/// assert!(is_placeholder("  "));
/// assert!(!is_placeholder("sk-or-v1-abc"));
/// ```
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("your_") || value.contains("your_api_key")
}

/// Resolved runtime settings.
///
/// Optional credentials are `None` when unset or placeholder, so a sink can
/// decide to skip itself by looking at a single field.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct Settings {
    /// Root directory for lessons, logs and backups
    workdir: PathBuf,
    /// Completion API key
    api_key: Option<String>,
    /// Completion endpoint
    api_url: String,
    /// Completion model
    model: String,
    /// SMTP login and sender address
    email_user: Option<String>,
    /// SMTP app password
    email_app_password: Option<String>,
    /// Recipient, defaults to the sender
    notification_email: Option<String>,
    /// SMTP relay host
    smtp_host: String,
    /// Discord webhook URL
    discord_webhook: Option<String>,
    /// Telegram bot token
    telegram_bot_token: Option<String>,
    /// Telegram chat id
    telegram_chat_id: Option<String>,
    /// Telegram Bot API base URL
    telegram_api_url: String,
    /// Learner level used in prompts
    learning_level: String,
    /// Learner focus areas used in prompts and tags
    focus_areas: Vec<String>,
    /// Preferred programming language
    preferred_language: String,
    /// Timezone for schedules and folder dates
    timezone: Tz,
    /// Debug logging
    debug_mode: bool,
    /// Generate a welcome lesson on first start
    auto_generate: bool,
    /// Copy lessons into `backups/`
    save_backups: bool,
    /// Where to write the notice when email fails
    desktop_notification_path: PathBuf,
    /// External schedule file
    schedule_path: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from `env_file` (if present) overlaid by the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if a value
    /// such as the timezone is invalid.
    pub fn load(workdir: impl AsRef<Path>, env_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let env_file = env_file.as_ref();
        let mut file_values = Vec::new();
        if env_file.exists() {
            let iter = dotenvy::from_path_iter(env_file).map_err(|e| {
                ConfigError::new(format!("Failed to read {}: {}", env_file.display(), e))
            })?;
            for item in iter {
                let (key, value) = item.map_err(|e| {
                    ConfigError::new(format!("Failed to parse {}: {}", env_file.display(), e))
                })?;
                file_values.push((key, value));
            }
            tracing::debug!(path = %env_file.display(), entries = file_values.len(), "Loaded env file");
        } else {
            tracing::debug!(path = %env_file.display(), "No env file, using process environment only");
        }

        let env_values = std::env::vars().filter(|(k, _)| KNOWN_KEYS.contains(&k.as_str()));
        Self::from_sources(workdir, file_values, env_values)
    }

    /// Builds settings from file values overlaid by environment values.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid values.
    pub fn from_sources(
        workdir: impl AsRef<Path>,
        file_values: impl IntoIterator<Item = (String, String)>,
        env_values: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let mut map: HashMap<String, String> = file_values.into_iter().collect();
        map.extend(env_values);
        Self::from_map(workdir, &map)
    }

    /// Builds settings from a flat key/value map.
    ///
    /// # Errors
    ///
    /// Returns an error when `LEARNING_TIMEZONE` is not an IANA zone name.
    pub fn from_map(
        workdir: impl AsRef<Path>,
        map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let workdir = workdir.as_ref().to_path_buf();
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !is_placeholder(v))
        };
        let flag = |key: &str| {
            get(key)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
                .unwrap_or(false)
        };

        let tz_name = get("LEARNING_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| ConfigError::new(format!("Unknown LEARNING_TIMEZONE '{}'", tz_name)))?;

        let focus_areas = get("FOCUS_AREAS")
            .unwrap_or_else(|| DEFAULT_FOCUS_AREAS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let desktop_notification_path = get("DESKTOP_NOTIFICATION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::desktop_dir()
                    .or_else(|| dirs::home_dir().map(|h| h.join("Desktop")))
                    .unwrap_or_else(|| workdir.clone())
                    .join(DESKTOP_NOTIFICATION_FILE)
            });

        Ok(Self {
            api_key: get("OPENROUTER_API_KEY"),
            api_url: get("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            email_user: get("EMAIL_USER"),
            email_app_password: get("EMAIL_APP_PASSWORD"),
            notification_email: get("NOTIFICATION_EMAIL"),
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            discord_webhook: get("DISCORD_WEBHOOK"),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            learning_level: get("LEARNING_LEVEL").unwrap_or_else(|| "intermediate".to_string()),
            focus_areas,
            preferred_language: get("PREFERRED_LANGUAGE")
                .unwrap_or_else(|| "javascript".to_string()),
            timezone,
            debug_mode: flag("DEBUG_MODE"),
            auto_generate: flag("AUTO_GENERATE"),
            save_backups: flag("SAVE_BACKUPS"),
            desktop_notification_path,
            schedule_path: get("LECTERN_SCHEDULE").map(|p| workdir.join(p)),
            workdir,
        })
    }

    /// Whether a usable completion API key is configured.
    pub fn api_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether SMTP credentials are present.
    pub fn email_configured(&self) -> bool {
        self.email_user.is_some() && self.email_app_password.is_some()
    }

    /// Whether the app password has the 16 characters Gmail issues (spaces ignored).
    pub fn app_password_well_formed(&self) -> bool {
        self.email_app_password
            .as_deref()
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).count() == 16)
            .unwrap_or(false)
    }

    /// Recipient address: `NOTIFICATION_EMAIL`, falling back to `EMAIL_USER`.
    pub fn recipient(&self) -> Option<&str> {
        self.notification_email
            .as_deref()
            .or(self.email_user.as_deref())
    }

    /// `<workdir>/daily-lessons`
    pub fn lessons_dir(&self) -> PathBuf {
        self.workdir.join("daily-lessons")
    }

    /// `<workdir>/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.workdir.join("logs")
    }

    /// `<workdir>/logs/daemon.pid`
    pub fn pid_file(&self) -> PathBuf {
        self.logs_dir().join("daemon.pid")
    }

    /// `<workdir>/logs/daemon.log`
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("daemon.log")
    }

    /// `<workdir>/logs/github-actions.log`
    pub fn run_log_file(&self) -> PathBuf {
        self.logs_dir().join("github-actions.log")
    }

    /// `<workdir>/backups`
    pub fn backups_dir(&self) -> PathBuf {
        self.workdir.join("backups")
    }

    /// `<workdir>/archive`
    pub fn archive_dir(&self) -> PathBuf {
        self.workdir.join("archive")
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Returns a copy with the working directory replaced.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Returns a copy with the completion endpoint replaced.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
