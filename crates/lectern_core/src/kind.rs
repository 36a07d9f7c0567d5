//! Lesson kinds.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// The category of a lesson.
///
/// Kinds render as kebab-case names (`pro-tip`, `ai-implementation`).
/// Unknown names are kept verbatim in [`LessonKind::Other`] so a schedule
/// entry for a new kind still produces a lesson.
///
/// # Examples
///
/// ```
/// use lectern_core::LessonKind;
///
/// let kind: LessonKind = "pro-tip".parse().unwrap();
/// assert_eq!(kind, LessonKind::ProTip);
/// assert_eq!(kind.to_string(), "pro-tip");
///
/// let custom: LessonKind = "lightning-talk".parse().unwrap();
/// assert_eq!(custom, LessonKind::Other("lightning-talk".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum LessonKind {
    /// Progressive beginner-to-pro series lesson
    #[display("series")]
    Series,
    /// Short, high-leverage technique
    #[display("pro-tip")]
    ProTip,
    /// Essential concepts
    #[display("knowledge")]
    Knowledge,
    /// Applying AI tooling to automation work
    #[display("ai-implementation")]
    AiImplementation,
    /// Advanced material
    #[display("expert")]
    Expert,
    /// First-run welcome lesson
    #[display("welcome")]
    Welcome,
    /// Weekly deep-dive session
    #[display("weekly-deep-dive")]
    WeeklyDeepDive,
    /// Monthly skills assessment
    #[display("monthly-assessment")]
    MonthlyAssessment,
    /// Any other kind name
    #[display("{}", _0)]
    Other(String),
}

impl LessonKind {
    /// The five kinds that have dedicated prompts.
    pub const PROMPTED: [LessonKind; 5] = [
        LessonKind::Series,
        LessonKind::ProTip,
        LessonKind::Knowledge,
        LessonKind::AiImplementation,
        LessonKind::Expert,
    ];

    /// Difficulty label written into the lesson header.
    pub fn difficulty(&self) -> &'static str {
        match self {
            Self::Series => "Beginner to Intermediate",
            Self::ProTip | Self::AiImplementation => "Advanced",
            Self::Expert => "Expert",
            _ => "Intermediate",
        }
    }

    /// Estimated reading and practice time.
    pub fn estimated_duration(&self) -> &'static str {
        match self {
            Self::Series => "30-45 minutes",
            Self::ProTip => "15-20 minutes",
            Self::Knowledge => "20-30 minutes",
            Self::AiImplementation => "45-60 minutes",
            Self::Expert => "60+ minutes",
            _ => "30 minutes",
        }
    }
}

impl FromStr for LessonKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "series" => Self::Series,
            "pro-tip" => Self::ProTip,
            "knowledge" => Self::Knowledge,
            "ai-implementation" => Self::AiImplementation,
            "expert" => Self::Expert,
            "welcome" => Self::Welcome,
            "weekly-deep-dive" => Self::WeeklyDeepDive,
            "monthly-assessment" => Self::MonthlyAssessment,
            other => Self::Other(other.to_string()),
        };
        Ok(kind)
    }
}

impl Serialize for LessonKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LessonKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        let Ok(kind) = name.parse::<LessonKind>();
        Ok(kind)
    }
}
