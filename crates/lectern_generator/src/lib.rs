//! Lesson generation.
//!
//! [`LessonGenerator::generate`] always returns an artifact: a completion
//! from the configured [`CompletionDriver`](lectern_models::CompletionDriver)
//! when the call succeeds, otherwise a canned lesson chosen by kind.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generator;
mod profile;
mod progression;
mod templates;

pub use generator::LessonGenerator;
pub use profile::{LearnerProfile, LearnerProfileBuilder};
pub use progression::{ProgressionContext, SKILL_LEVELS, START_DATE};
pub use templates::{WelcomeStatus, fallback_body, prompt_template};
