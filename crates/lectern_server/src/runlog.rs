//! NDJSON log of one-shot runs.

use chrono::{DateTime, Utc};
use lectern_core::DeliveryRecord;
use lectern_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RunRecord {
    /// When the run finished
    timestamp: DateTime<Utc>,
    /// Job or lesson kind that ran
    job: String,
    /// Whether the pipeline completed
    success: bool,
    /// Lesson title, for lesson runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Saved lesson or summary file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    /// `model:<id>` or `fallback:<reason>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    /// Lessons counted, for summary runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lessons: Option<usize>,
    /// Per-sink outcomes
    #[serde(default)]
    deliveries: Vec<DeliveryRecord>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunRecord {
    pub(crate) fn new(job: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            job: job.into(),
            success: true,
            title: None,
            path: None,
            source: None,
            lessons: None,
            deliveries: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn lesson(
        mut self,
        title: &str,
        path: PathBuf,
        source: String,
        deliveries: Vec<DeliveryRecord>,
    ) -> Self {
        self.title = Some(title.to_string());
        self.path = Some(path);
        self.source = Some(source);
        self.deliveries = deliveries;
        self
    }

    pub(crate) fn summary(mut self, path: PathBuf, lessons: usize, email: DeliveryRecord) -> Self {
        self.path = Some(path);
        self.lessons = Some(lessons);
        self.deliveries = vec![email];
        self
    }

    pub(crate) fn failed(mut self, error: impl std::fmt::Display) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self
    }
}

/// Append-only NDJSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Wraps `path`; the file and its directory are created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub async fn append(&self, record: &RunRecord) -> Result<(), StorageError> {
        let write_err = |e: &dyn std::fmt::Display| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(&e))?;
        }
        let mut line = serde_json::to_string(record).map_err(|e| write_err(&e))?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| write_err(&e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| write_err(&e))?;
        Ok(())
    }

    /// Every record in the file. A missing file is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a record.
    pub async fn read_all(&self) -> Result<Vec<RunRecord>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                ))));
            }
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        self.path.display(),
                        e
                    )))
                })
            })
            .collect()
    }
}
