//! The lesson store.

use crate::{LearningStats, LessonEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lectern_core::LessonArtifact;
use lectern_error::{StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;

const LESSONS_DIR: &str = "daily-lessons";
const ARCHIVE_DIR: &str = "archive";
const BACKUPS_DIR: &str = "backups";
const MAX_STREAK_DAYS: u32 = 365;
const RECENT_WINDOW_DAYS: i64 = 30;

/// Dated markdown storage rooted at a working directory.
///
/// Every method is safe to call from concurrent jobs: folder creation is
/// idempotent and lesson files are opened with `create_new`, so two writers
/// never share a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonStore {
    root: PathBuf,
}

impl LessonStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The working directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/daily-lessons`
    pub fn lessons_dir(&self) -> PathBuf {
        self.root.join(LESSONS_DIR)
    }

    /// `<root>/daily-lessons/<date>`
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.lessons_dir().join(date.format("%Y-%m-%d").to_string())
    }

    /// Ensures the folder for `date` exists and returns it.
    ///
    /// Calling this repeatedly for the same date returns the same path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::DirectoryCreation`] if the folder cannot be created.
    #[tracing::instrument(skip(self))]
    pub async fn create_daily_folder(&self, date: NaiveDate) -> Result<PathBuf, StorageError> {
        let dir = self.day_dir(date);
        create_dir(&dir).await?;
        Ok(dir)
    }

    /// Writes `artifact` into the folder for `date`.
    ///
    /// The filename is `<kind>-<epoch-ms>.md` using the artifact's generation
    /// time. If the name is taken the millisecond value is bumped until a
    /// free name is found.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be written.
    #[tracing::instrument(skip(self, artifact), fields(kind = %artifact.header().kind()))]
    pub async fn save(
        &self,
        artifact: &LessonArtifact,
        date: NaiveDate,
    ) -> Result<PathBuf, StorageError> {
        let dir = self.create_daily_folder(date).await?;
        let kind = artifact.header().kind().to_string();
        let mut millis = artifact.header().generated().timestamp_millis();
        let content = artifact.to_markdown();

        loop {
            let path = dir.join(format!("{}-{}.md", kind, millis));
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())
                        .await
                        .map_err(|e| write_error(&path, e))?;
                    file.flush().await.map_err(|e| write_error(&path, e))?;
                    tracing::info!(path = %path.display(), bytes = content.len(), "Saved lesson");
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "Lesson filename taken, bumping timestamp");
                    millis += 1;
                }
                Err(e) => return Err(write_error(&path, e)),
            }
        }
    }

    /// Writes a named document (summary, report) into the folder for `date`,
    /// replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write_document(
        &self,
        date: NaiveDate,
        file_name: &str,
        content: &str,
    ) -> Result<PathBuf, StorageError> {
        let dir = self.create_daily_folder(date).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| write_error(&path, e))?;
        tracing::info!(path = %path.display(), "Wrote document");
        Ok(path)
    }

    /// Reads a lesson file back into an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] for a missing file and
    /// [`StorageErrorKind::FileRead`] for unreadable or unparseable content.
    pub async fn load(&self, path: &Path) -> Result<LessonArtifact, StorageError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                read_error(path, e)
            }
        })?;
        LessonArtifact::parse(&content).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }

    /// Copies a lesson file into `backups/<date>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    #[tracing::instrument(skip(self))]
    pub async fn backup(&self, source: &Path, date: NaiveDate) -> Result<PathBuf, StorageError> {
        let dir = self
            .root
            .join(BACKUPS_DIR)
            .join(date.format("%Y-%m-%d").to_string());
        create_dir(&dir).await?;
        let file_name = source.file_name().ok_or_else(|| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{} has no file name",
                source.display()
            )))
        })?;
        let target = dir.join(file_name);
        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| write_error(&target, e))?;
        tracing::debug!(from = %source.display(), to = %target.display(), "Backed up lesson");
        Ok(target)
    }

    /// Every lesson file modified after `cutoff`, oldest first.
    ///
    /// A missing `daily-lessons/` folder yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked.
    pub async fn lessons_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<LessonEntry>, StorageError> {
        let mut entries = self.all_lessons().await?;
        entries.retain(|e| *e.modified() > cutoff);
        Ok(entries)
    }

    /// Every lesson file under `daily-lessons/`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked.
    pub async fn all_lessons(&self) -> Result<Vec<LessonEntry>, StorageError> {
        let dir = self.lessons_dir();
        let walked = tokio::task::spawn_blocking(move || walk_lessons(&dir))
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::FileRead(e.to_string())))??;
        Ok(walked)
    }

    /// Consecutive days, counting back from `today`, whose folder holds a lesson.
    ///
    /// Capped at 365.
    ///
    /// # Errors
    ///
    /// Returns an error if a day folder exists but cannot be read.
    pub async fn streak(&self, today: NaiveDate) -> Result<u32, StorageError> {
        let mut streak = 0;
        let mut day = today;
        while streak < MAX_STREAK_DAYS {
            if !self.day_has_lessons(day).await? {
                break;
            }
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        Ok(streak)
    }

    /// Whether the folder for `date` contains at least one `.md` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder exists but cannot be read.
    pub async fn day_has_lessons(&self, date: NaiveDate) -> Result<bool, StorageError> {
        let dir = self.day_dir(date);
        let mut read = match tokio::fs::read_dir(&dir).await {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(read_error(&dir, e)),
        };
        while let Some(entry) = read.next_entry().await.map_err(|e| read_error(&dir, e))? {
            if is_markdown(&entry.path()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Totals, 30-day count and streak.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn stats(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<LearningStats, StorageError> {
        let all = self.all_lessons().await?;
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let recent = all.iter().filter(|e| *e.modified() > cutoff).count();
        let streak = self.streak(today).await?;
        Ok(LearningStats::new(all.len(), recent, streak))
    }

    /// Writes `progress-report.md` into today's folder.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered or the file written.
    pub async fn write_progress_report(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<(PathBuf, LearningStats), StorageError> {
        let stats = self.stats(now, today).await?;
        let report = render_progress_report(&stats, now);
        let path = self
            .write_document(today, "progress-report.md", &report)
            .await?;
        Ok((path, stats))
    }

    /// Moves day folders dated more than `days` before `today` into `archive/`.
    ///
    /// Folders whose names are not dates are left alone. Returns the new
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the lessons folder cannot be read or a move fails.
    #[tracing::instrument(skip(self))]
    pub async fn archive_older_than(
        &self,
        days: i64,
        today: NaiveDate,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let lessons = self.lessons_dir();
        let cutoff = today - Duration::days(days);
        let mut read = match tokio::fs::read_dir(&lessons).await {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(&lessons, e)),
        };

        let archive = self.root.join(ARCHIVE_DIR);
        let mut moved = Vec::new();
        while let Some(entry) = read.next_entry().await.map_err(|e| read_error(&lessons, e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            let Ok(date) = NaiveDate::parse_from_str(&name, "%Y-%m-%d") else {
                continue;
            };
            if date >= cutoff || !entry.path().is_dir() {
                continue;
            }
            create_dir(&archive).await?;
            let target = archive.join(&name);
            tokio::fs::rename(entry.path(), &target).await.map_err(|e| {
                StorageError::new(StorageErrorKind::Move(format!(
                    "{} to {}: {}",
                    entry.path().display(),
                    target.display(),
                    e
                )))
            })?;
            tracing::info!(folder = %name, "Archived lesson folder");
            moved.push(target);
        }
        moved.sort();
        Ok(moved)
    }
}

fn render_progress_report(stats: &LearningStats, now: DateTime<Utc>) -> String {
    let streak_note = if *stats.streak_days() > 7 {
        "A streak of more than a week. The habit is taking hold."
    } else {
        "Short streak so far. One lesson a day keeps it growing."
    };
    let volume_note = if *stats.recent_lessons() > 20 {
        "Strong month: more than twenty lessons."
    } else {
        "Lighter month. There is room for more sessions."
    };
    format!(
        "# Learning Progress Report\n\n\
         Generated: {}\n\n\
         ## Statistics\n\n\
         - **Total lessons**: {}\n\
         - **Last 30 days**: {}\n\
         - **Streak**: {} days\n\
         - **Weekly average**: {} lessons\n\n\
         ## Notes\n\n\
         {}\n\
         {}\n",
        now.format("%Y-%m-%d %H:%M UTC"),
        stats.total_lessons(),
        stats.recent_lessons(),
        stats.streak_days(),
        stats.weekly_average(),
        streak_note,
        volume_note,
    )
}

fn walk_lessons(dir: &Path) -> Result<Vec<LessonEntry>, StorageError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }
        let modified: SystemTime = entry
            .metadata()
            .map_err(|e| read_error(path, e.into()))?
            .modified()
            .map_err(|e| read_error(path, e))?;
        let name = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        entries.push(LessonEntry::new(name, path.to_path_buf(), modified.into()));
    }
    entries.sort_by(|a, b| a.modified().cmp(b.modified()).then(a.name().cmp(b.name())));
    Ok(entries)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

async fn create_dir(dir: &Path) -> Result<(), StorageError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            dir.display(),
            e
        )))
    })
}

fn write_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::FileWrite(format!(
        "{}: {}",
        path.display(),
        e
    )))
}

fn read_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::FileRead(format!(
        "{}: {}",
        path.display(),
        e
    )))
}
