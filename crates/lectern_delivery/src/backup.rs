//! Local backup sink.

use crate::sink::Sink;
use async_trait::async_trait;
use chrono_tz::Tz;
use lectern_core::{LessonArtifact, SinkKind};
use lectern_error::{DeliveryError, DeliveryErrorKind};
use lectern_storage::LessonStore;
use std::path::Path;

/// Copies the lesson file into `backups/<date>/`.
#[derive(Debug, Clone)]
pub struct BackupSink {
    store: LessonStore,
    enabled: bool,
    timezone: Tz,
}

impl BackupSink {
    /// Creates the sink. Dates are taken from the artifact's timestamp in `timezone`.
    pub fn new(store: LessonStore, enabled: bool, timezone: Tz) -> Self {
        Self {
            store,
            enabled,
            timezone,
        }
    }
}

#[async_trait]
impl Sink for BackupSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Backup
    }

    fn skip_reason(&self) -> Option<String> {
        (!self.enabled).then(|| "SAVE_BACKUPS is off".to_string())
    }

    async fn send(&self, artifact: &LessonArtifact, path: &Path) -> Result<(), DeliveryError> {
        let date = artifact
            .header()
            .generated()
            .with_timezone(&self.timezone)
            .date_naive();
        self.store
            .backup(path, date)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Io(e.kind().to_string())))
    }
}
