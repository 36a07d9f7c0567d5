//! The sink trait.

use async_trait::async_trait;
use lectern_core::{LessonArtifact, SinkKind};
use lectern_error::DeliveryError;
use std::path::{Path, PathBuf};

/// A delivery destination.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Which destination this is.
    fn kind(&self) -> SinkKind;

    /// Why the sink cannot run, or `None` when it is configured.
    fn skip_reason(&self) -> Option<String>;

    /// Delivers the lesson saved at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] when the destination rejects or never receives it.
    async fn send(&self, artifact: &LessonArtifact, path: &Path) -> Result<(), DeliveryError>;

    /// Writes a local substitute after a failed send and returns its path.
    async fn recover(
        &self,
        _artifact: &LessonArtifact,
        _path: &Path,
        _error: &DeliveryError,
    ) -> Option<PathBuf> {
        None
    }
}
