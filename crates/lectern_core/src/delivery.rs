//! Per-sink delivery results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A delivery destination.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SinkKind {
    /// SMTP email
    Email,
    /// Discord webhook
    Discord,
    /// Telegram bot
    Telegram,
    /// Local backup directory
    Backup,
}

/// What happened when an artifact was handed to one sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// The sink accepted the artifact
    Sent,
    /// The sink is not configured and was never attempted
    Skipped {
        /// Which setting is missing
        reason: String,
    },
    /// The sink was attempted and failed
    Failed {
        /// Error description
        error: String,
        /// Local file written in place of the delivery, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<PathBuf>,
    },
}

impl DeliveryOutcome {
    /// Builds a skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Builds a failed outcome with no fallback file.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
            fallback: None,
        }
    }

    /// Whether the sink accepted the artifact.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Whether the sink was left alone for lack of configuration.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Whether the sink was attempted and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The outcome for one sink.
///
/// # Examples
///
/// ```
/// use lectern_core::{DeliveryOutcome, DeliveryRecord, SinkKind};
///
/// let record = DeliveryRecord::new(SinkKind::Discord, DeliveryOutcome::skipped("DISCORD_WEBHOOK not set"));
/// assert!(record.outcome().is_skipped());
/// assert_eq!(record.sink().to_string(), "discord");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct DeliveryRecord {
    /// Destination
    sink: SinkKind,
    /// Result
    #[serde(flatten)]
    outcome: DeliveryOutcome,
}

impl DeliveryRecord {
    /// Pairs a sink with its outcome.
    pub fn new(sink: SinkKind, outcome: DeliveryOutcome) -> Self {
        Self { sink, outcome }
    }
}
