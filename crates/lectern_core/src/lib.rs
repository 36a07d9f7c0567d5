//! Core data types for the Lectern lesson scheduler.
//!
//! Everything that crosses a crate boundary lives here: the kind of lesson
//! being asked for, the finished artifact, and what happened when it was
//! handed to each delivery sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod delivery;
mod kind;
mod request;

pub use artifact::{ArtifactHeader, ArtifactHeaderBuilder, ArtifactSource, LessonArtifact};
pub use delivery::{DeliveryOutcome, DeliveryRecord, SinkKind};
pub use kind::LessonKind;
pub use request::{LessonRequest, LessonRequestBuilder};
