//! Flat-file lesson storage.
//!
//! Lessons live under `daily-lessons/<YYYY-MM-DD>/<kind>-<epoch-ms>.md`
//! inside a working directory. Nothing else is persisted: statistics,
//! streaks and summaries are recomputed from the tree on demand.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod stats;
mod store;

pub use stats::{LearningStats, LessonEntry};
pub use store::LessonStore;
