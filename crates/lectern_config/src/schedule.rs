//! Job schedule configuration.
//!
//! Schedules are TOML tables of jobs. Cron expressions may use the common
//! five-field form (`min hour dom month dow`, Sunday = 0) or the six-field
//! form with seconds that the `cron` crate parses natively.
//!
//! ```toml
//! [[jobs]]
//! name = "morning-series"
//! cron = "0 7 * * *"
//! action = "lesson"
//! kind = "series"
//! title = "From Beginner to PRO"
//! focus = "progressive_learning"
//!
//! [[jobs]]
//! name = "weekly-summary"
//! cron = "0 18 * * 0"
//! action = "weekly-summary"
//! ```

use lectern_core::{LessonKind, LessonRequest};
use lectern_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

const WEEKDAYS: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Converts a cron expression into the six-field form the `cron` crate reads.
///
/// Five-field expressions gain a leading `0` seconds field and have numeric
/// weekdays (`0`-`7`, Sunday = 0 or 7) rewritten as names, since the `cron`
/// crate numbers weekdays from 1.
///
/// # Errors
///
/// Returns an error when the expression has fewer than five fields.
///
/// # Examples
///
/// ```
/// use lectern_config::normalize_cron;
///
/// assert_eq!(normalize_cron("0 18 * * 0").unwrap(), "0 0 18 * * Sun");
/// assert_eq!(normalize_cron("30 9 * * 1-5").unwrap(), "0 30 9 * * Mon-Fri");
/// assert_eq!(normalize_cron("0 0 7 * * *").unwrap(), "0 0 7 * * *");
/// ```
pub fn normalize_cron(expression: &str) -> Result<String, ConfigError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    match fields.len() {
        5 => {
            let dow = rewrite_weekdays(fields[4])?;
            Ok(format!(
                "0 {} {} {} {} {}",
                fields[0], fields[1], fields[2], fields[3], dow
            ))
        }
        6 | 7 => Ok(fields.join(" ")),
        n => Err(ConfigError::new(format!(
            "Cron expression '{}' has {} fields, expected 5 or 6",
            expression, n
        ))),
    }
}

fn rewrite_weekdays(field: &str) -> Result<String, ConfigError> {
    let items = field
        .split(',')
        .map(|item| {
            let (base, step) = match item.split_once('/') {
                Some((base, step)) => (base, Some(step)),
                None => (item, None),
            };
            let base = base
                .split('-')
                .map(weekday_name)
                .collect::<Result<Vec<_>, _>>()?
                .join("-");
            Ok(match step {
                Some(step) => format!("{}/{}", base, step),
                None => base,
            })
        })
        .collect::<Result<Vec<String>, ConfigError>>()?;
    Ok(items.join(","))
}

fn weekday_name(token: &str) -> Result<String, ConfigError> {
    match token.parse::<usize>() {
        Ok(n) => WEEKDAYS
            .get(n)
            .map(|name| name.to_string())
            .ok_or_else(|| ConfigError::new(format!("Weekday {} out of range 0-7", n))),
        Err(_) => Ok(token.to_string()),
    }
}

/// What a job does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum JobAction {
    /// Generate and deliver one lesson
    Lesson {
        /// Lesson kind
        kind: LessonKind,
        /// Lesson title
        title: String,
        /// Prompt focus
        #[serde(default)]
        focus: String,
    },
    /// Mail the trailing seven-day summary
    WeeklySummary,
}

impl JobAction {
    /// The lesson request for a lesson job.
    pub fn request(&self) -> Option<LessonRequest> {
        match self {
            Self::Lesson { kind, title, focus } => {
                Some(LessonRequest::new(kind.clone(), title.clone(), focus.clone()))
            }
            Self::WeeklySummary => None,
        }
    }
}

/// One scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct JobSpec {
    /// Unique job name, used in logs
    name: String,
    /// Cron expression as written
    cron: String,
    /// What to run
    #[serde(flatten)]
    action: JobAction,
}

impl JobSpec {
    /// Creates a job.
    pub fn new(name: impl Into<String>, cron: impl Into<String>, action: JobAction) -> Self {
        Self {
            name: name.into(),
            cron: cron.into(),
            action,
        }
    }

    /// Six-field form of [`JobSpec::cron`].
    ///
    /// # Errors
    ///
    /// Returns an error when the expression is malformed.
    pub fn normalized_cron(&self) -> Result<String, ConfigError> {
        normalize_cron(&self.cron)
    }

    fn lesson(name: &str, cron: &str, kind: LessonKind, title: &str, focus: &str) -> Self {
        Self::new(
            name,
            cron,
            JobAction::Lesson {
                kind,
                title: title.to_string(),
                focus: focus.to_string(),
            },
        )
    }
}

/// The daemon's job table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScheduleConfig {
    /// Jobs in file order
    #[serde(default)]
    jobs: Vec<JobSpec>,
}

impl Default for ScheduleConfig {
    /// Five daily lessons, a Sunday summary and a monthly assessment.
    fn default() -> Self {
        Self {
            jobs: vec![
                JobSpec::lesson(
                    "morning-series",
                    "0 7 * * *",
                    LessonKind::Series,
                    "From Beginner to PRO",
                    "progressive_learning",
                ),
                JobSpec::lesson(
                    "pro-tip",
                    "0 8 * * *",
                    LessonKind::ProTip,
                    "Pro-Tip Power Hour",
                    "expert_techniques",
                ),
                JobSpec::lesson(
                    "knowledge",
                    "0 13 * * *",
                    LessonKind::Knowledge,
                    "Things to Know",
                    "essential_concepts",
                ),
                JobSpec::lesson(
                    "ai-implementation",
                    "0 15 * * *",
                    LessonKind::AiImplementation,
                    "AI Implementation Masterclass",
                    "ai_automation",
                ),
                JobSpec::lesson(
                    "expert",
                    "0 17 * * *",
                    LessonKind::Expert,
                    "Expert Level - Only PRO Can Do",
                    "master_level",
                ),
                JobSpec::new("weekly-summary", "0 18 * * 0", JobAction::WeeklySummary),
                JobSpec::lesson(
                    "monthly-assessment",
                    "0 9 1 * *",
                    LessonKind::MonthlyAssessment,
                    "Monthly Skills Assessment",
                    "skill_progression",
                ),
            ],
        }
    }
}

impl ScheduleConfig {
    /// Creates a schedule from jobs, validating it.
    ///
    /// # Errors
    ///
    /// See [`ScheduleConfig::validate`].
    pub fn new(jobs: Vec<JobSpec>) -> Result<Self, ConfigError> {
        let config = Self { jobs };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML schedule.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or an invalid job table.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse schedule: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML schedule file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read schedule {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), jobs = config.jobs.len(), "Loaded schedule");
        Ok(config)
    }

    /// Reads `path` when given, otherwise returns the built-in schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file is unreadable or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks that the table is non-empty, names are unique and every cron parses.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::new("Schedule has no jobs"));
        }
        let mut names = HashSet::new();
        for job in &self.jobs {
            if !names.insert(job.name.as_str()) {
                return Err(ConfigError::new(format!("Duplicate job name '{}'", job.name)));
            }
            let expression = job.normalized_cron()?;
            cron::Schedule::from_str(&expression).map_err(|e| {
                ConfigError::new(format!(
                    "Job '{}' has invalid cron '{}': {}",
                    job.name, job.cron, e
                ))
            })?;
        }
        Ok(())
    }

    /// Finds a job by name.
    pub fn job(&self, name: &str) -> Option<&JobSpec> {
        self.jobs.iter().find(|j| j.name == name)
    }
}
