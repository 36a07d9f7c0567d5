//! Configuration for the Lectern lesson scheduler.
//!
//! - [`Settings`]: credentials and preferences read from a `.env` style
//!   file, with process environment variables taking precedence.
//! - [`EnvFile`] and [`SetupAnswers`]: writing and updating that file.
//! - [`ScheduleConfig`]: the cron job table, from TOML or the built-in default.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod env_file;
mod schedule;
mod settings;

pub use env_file::{EnvFile, SetupAnswers, SetupAnswersBuilder, validate_api_key};
pub use schedule::{JobAction, JobSpec, ScheduleConfig, normalize_cron};
pub use settings::{Settings, is_placeholder};
