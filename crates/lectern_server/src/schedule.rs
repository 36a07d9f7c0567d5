//! When jobs fire.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use lectern_config::JobSpec;
use lectern_error::{DaemonError, DaemonErrorKind};
use std::str::FromStr;

/// Something that knows its next firing time.
pub trait Schedule {
    /// The first firing strictly after `after`, or `None` when exhausted.
    fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// How long to sleep from `now` until the next firing.
    fn until_next(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.next_execution(now)
            .map(|next| (next - now).to_std().unwrap_or_default())
    }
}

/// Schedule kinds the daemon runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleType {
    /// Six-field cron expression evaluated in a timezone
    Cron {
        /// Cron expression, seconds first
        expression: String,
        /// Wall clock the expression refers to
        timezone: Tz,
    },
    /// Fixed interval
    Interval {
        /// Interval in seconds
        seconds: u64,
    },
}

impl ScheduleType {
    /// The cron schedule for `job` in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonErrorKind::InvalidSchedule`] when the expression does not parse.
    pub fn for_job(job: &JobSpec, timezone: Tz) -> Result<Self, DaemonError> {
        let invalid = |reason: String| {
            DaemonError::new(DaemonErrorKind::InvalidSchedule {
                name: job.name().clone(),
                reason,
            })
        };
        let expression = job.normalized_cron().map_err(|e| invalid(e.message.clone()))?;
        cron::Schedule::from_str(&expression).map_err(|e| invalid(e.to_string()))?;
        Ok(Self::Cron {
            expression,
            timezone,
        })
    }

    /// The hourly health tick.
    pub fn hourly() -> Self {
        Self::Interval { seconds: 3600 }
    }
}

impl Schedule for ScheduleType {
    fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ScheduleType::Interval { seconds } => Some(after + Duration::seconds(*seconds as i64)),
            ScheduleType::Cron {
                expression,
                timezone,
            } => {
                let schedule = cron::Schedule::from_str(expression).ok()?;
                schedule
                    .after(&after.with_timezone(timezone))
                    .next()
                    .map(|next| next.with_timezone(&Utc))
            }
        }
    }
}
