//! Writing and updating the `.env` style settings file.

use chrono::{DateTime, Utc};
use lectern_error::ConfigError;
use std::path::{Path, PathBuf};

const API_KEY_PREFIX: &str = "sk-or-v1-";

/// Checks that `key` looks like an OpenRouter key.
///
/// # Errors
///
/// Returns an error when the key is blank or lacks the `sk-or-v1-` prefix.
///
/// # Examples
///
/// ```
/// use lectern_config::validate_api_key;
///
/// assert!(validate_api_key("sk-or-v1-0123").is_ok());
/// assert!(validate_api_key("sk-abc").is_err());
/// ```
pub fn validate_api_key(key: &str) -> Result<(), ConfigError> {
    if key.trim().starts_with(API_KEY_PREFIX) && key.trim().len() > API_KEY_PREFIX.len() {
        Ok(())
    } else {
        Err(ConfigError::new(format!(
            "Invalid API key format. Must start with {}",
            API_KEY_PREFIX
        )))
    }
}

/// Everything the setup wizard collects.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct SetupAnswers {
    /// Completion API key, or a placeholder
    api_key: String,
    /// SMTP login
    email_user: String,
    /// SMTP app password, or a placeholder
    email_app_password: String,
    /// Recipient
    notification_email: String,
    /// beginner, intermediate, advanced or expert
    learning_level: String,
    /// Comma-separated focus areas
    focus_areas: String,
    /// javascript, typescript, or both
    preferred_language: String,
    /// IANA timezone name
    timezone: String,
}

impl SetupAnswers {
    /// Creates a new builder.
    pub fn builder() -> SetupAnswersBuilder {
        SetupAnswersBuilder::default()
    }

    /// Renders the complete env file.
    pub fn render(&self, generated: DateTime<Utc>) -> String {
        format!(
            "# Lectern configuration\n\
             # Generated on {generated}\n\
             \n\
             # Completion API\n\
             OPENROUTER_API_KEY={api_key}\n\
             \n\
             # Email\n\
             EMAIL_USER={email_user}\n\
             EMAIL_APP_PASSWORD={email_app_password}\n\
             NOTIFICATION_EMAIL={notification_email}\n\
             \n\
             # Learning preferences\n\
             LEARNING_LEVEL={learning_level}\n\
             FOCUS_AREAS={focus_areas}\n\
             PREFERRED_LANGUAGE={preferred_language}\n\
             LEARNING_TIMEZONE={timezone}\n\
             \n\
             # System\n\
             DEBUG_MODE=false\n\
             AUTO_GENERATE=true\n\
             SAVE_BACKUPS=true\n",
            generated = generated.to_rfc3339(),
            api_key = quote(&self.api_key),
            email_user = quote(&self.email_user),
            email_app_password = quote(&self.email_app_password),
            notification_email = quote(&self.notification_email),
            learning_level = quote(&self.learning_level),
            focus_areas = quote(&self.focus_areas),
            preferred_language = quote(&self.preferred_language),
            timezone = quote(&self.timezone),
        )
    }
}

/// Wraps `value` in double quotes, escaping what dotenvy would otherwise
/// interpret inside them.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Leaves plain tokens bare so hand-edited files stay readable.
fn quote_if_needed(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '+'));
    if plain && !value.is_empty() {
        value.to_string()
    } else {
        quote(value)
    }
}

/// A `.env` style file on disk.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct EnvFile {
    /// File location
    path: PathBuf,
}

impl EnvFile {
    /// Wraps a path; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrites the file with the wizard's answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_answers(&self, answers: &SetupAnswers) -> Result<(), ConfigError> {
        write(&self.path, &answers.render(Utc::now()))?;
        tracing::info!(path = %self.path.display(), "Wrote configuration file");
        Ok(())
    }

    /// Replaces the `key=` line in place, or appends one if absent.
    ///
    /// Other lines, comments and ordering are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ConfigError::new(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let prefix = format!("{}=", key);
        let mut replaced = false;
        let mut lines: Vec<String> = content
            .lines()
            .map(|line| {
                if !replaced && line.trim_start().starts_with(&prefix) {
                    replaced = true;
                    format!("{}{}", prefix, quote_if_needed(value))
                } else {
                    line.to_string()
                }
            })
            .collect();
        if !replaced {
            lines.push(format!("{}{}", prefix, quote_if_needed(value)));
        }

        let mut updated = lines.join("\n");
        updated.push('\n');
        write(&self.path, &updated)?;
        tracing::info!(path = %self.path.display(), key, replaced, "Updated configuration key");
        Ok(())
    }
}

fn write(path: &Path, content: &str) -> Result<(), ConfigError> {
    std::fs::write(path, content)
        .map_err(|e| ConfigError::new(format!("Failed to write {}: {}", path.display(), e)))
}
