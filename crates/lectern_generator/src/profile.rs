//! Learner preferences that shape every prompt.

/// Who the lessons are for.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct LearnerProfile {
    /// beginner, intermediate, advanced or expert
    #[builder(default = "String::from(\"intermediate\")")]
    level: String,
    /// Topics the learner cares about; also used as artifact tags
    #[builder(default)]
    focus_areas: Vec<String>,
    /// Language for code samples
    #[builder(default = "String::from(\"javascript\")")]
    language: String,
}

impl LearnerProfile {
    /// Creates a profile.
    pub fn new(level: impl Into<String>, focus_areas: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            focus_areas,
            language: language.into(),
        }
    }

    /// Creates a new builder.
    pub fn builder() -> LearnerProfileBuilder {
        LearnerProfileBuilder::default()
    }

    pub(crate) fn render(&self) -> String {
        let focus = if self.focus_areas.is_empty() {
            "general automation".to_string()
        } else {
            self.focus_areas.join(", ")
        };
        format!(
            "LEARNER:\n- Level: {}\n- Focus areas: {}\n- Preferred language: {}",
            self.level, focus, self.language
        )
    }
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            level: "intermediate".to_string(),
            focus_areas: Vec::new(),
            language: "javascript".to_string(),
        }
    }
}
