//! Listing and statistics types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A lesson file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct LessonEntry {
    /// Path relative to `daily-lessons/`, e.g. `2026-03-14/series-1773475200000.md`
    name: String,
    /// Absolute path
    path: PathBuf,
    /// Last modification time
    modified: DateTime<Utc>,
}

impl LessonEntry {
    pub(crate) fn new(name: String, path: PathBuf, modified: DateTime<Utc>) -> Self {
        Self {
            name,
            path,
            modified,
        }
    }
}

/// Aggregate learning statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct LearningStats {
    /// Every lesson file under `daily-lessons/`
    total_lessons: usize,
    /// Lessons modified in the trailing 30 days
    recent_lessons: usize,
    /// Consecutive days with at least one lesson, ending today
    streak_days: u32,
}

impl LearningStats {
    pub(crate) fn new(total_lessons: usize, recent_lessons: usize, streak_days: u32) -> Self {
        Self {
            total_lessons,
            recent_lessons,
            streak_days,
        }
    }

    /// Average lessons per week over the trailing 30 days.
    pub fn weekly_average(&self) -> usize {
        (self.recent_lessons as f64 / (30.0 / 7.0)).round() as usize
    }
}
