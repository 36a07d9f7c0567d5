//! Lesson requests.

use crate::LessonKind;
use serde::{Deserialize, Serialize};

/// A request for one lesson, created by a scheduled job and consumed once.
///
/// # Examples
///
/// ```
/// use lectern_core::{LessonKind, LessonRequest};
///
/// let request = LessonRequest::builder()
///     .kind(LessonKind::Knowledge)
///     .title("Things to Know")
///     .focus("essential_concepts")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.title(), "Things to Know");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct LessonRequest {
    /// Which prompt and fallback to use.
    kind: LessonKind,
    /// Human title, also substituted into fallback lessons.
    title: String,
    /// Topic the prompt should concentrate on.
    #[builder(default)]
    #[serde(default)]
    focus: String,
}

impl LessonRequest {
    /// Creates a new request builder.
    pub fn builder() -> LessonRequestBuilder {
        LessonRequestBuilder::default()
    }

    /// Shorthand constructor.
    pub fn new(kind: LessonKind, title: impl Into<String>, focus: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            focus: focus.into(),
        }
    }
}
