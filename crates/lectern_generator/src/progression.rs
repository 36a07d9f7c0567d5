//! Day-based progression context appended to every prompt.

use chrono::NaiveDate;
use serde::Serialize;

/// Day zero of the learning journey.
pub const START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 9, 29) {
    Some(date) => date,
    None => panic!("invalid start date"),
};

/// Skill levels, one step every 30 days.
pub const SKILL_LEVELS: [&str; 7] = [
    "foundational",
    "intermediate",
    "advanced",
    "expert",
    "master",
    "innovator",
    "thought_leader",
];

const TECHNIQUES: [&str; 12] = [
    "advanced_patterns",
    "performance_optimization",
    "error_handling",
    "scalability",
    "security_automation",
    "ai_integration",
    "cross_platform",
    "mobile_automation",
    "api_orchestration",
    "data_validation",
    "visual_testing",
    "accessibility_automation",
];

const SCENARIOS: [&str; 10] = [
    "enterprise_scale",
    "startup_rapid_deployment",
    "legacy_system_integration",
    "cloud_native",
    "hybrid_environments",
    "international_compliance",
    "real_time_systems",
    "high_availability",
    "disaster_recovery",
    "multi_tenant",
];

const INDUSTRIES: [&str; 10] = [
    "fintech",
    "healthcare",
    "e_commerce",
    "manufacturing",
    "education",
    "government",
    "entertainment",
    "logistics",
    "energy",
    "telecommunications",
];

const EMERGING_TRENDS: [&str; 9] = [
    "ai_assisted_testing",
    "blockchain_validation",
    "iot_automation",
    "quantum_computing_prep",
    "edge_computing",
    "serverless_testing",
    "microservices_orchestration",
    "kubernetes_automation",
    "devops_integration",
];

const MILESTONES: [u32; 10] = [30, 90, 180, 365, 500, 730, 1000, 1095, 1460, 1825];
const CYCLE_DAYS: u32 = 365;

/// Rotating context for one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct ProgressionContext {
    /// Whole days since [`START_DATE`], never negative
    days: u32,
    /// Current skill level
    skill_level: &'static str,
    /// Technique of the day
    technique: &'static str,
    /// Scenario of the day
    scenario: &'static str,
    /// Industry of the day
    industry: &'static str,
    /// Emerging trend of the day
    emerging_trend: &'static str,
    /// Grows by 1.0 per 100 days, capped at 3.0
    complexity: f64,
    /// Next milestone day, `None` once every milestone is passed
    next_milestone: Option<u32>,
    /// `<days>_<epoch-ms>`
    session_id: String,
}

impl ProgressionContext {
    /// Context for `today`, counted from `start`.
    ///
    /// Dates before `start` count as day zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use lectern_generator::{ProgressionContext, START_DATE};
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
    /// let ctx = ProgressionContext::for_day(START_DATE, today, 0);
    /// assert_eq!(*ctx.days(), 60);
    /// assert_eq!(ctx.skill_level().to_string(), "advanced");
    /// assert_eq!(*ctx.next_milestone(), Some(90));
    /// ```
    pub fn for_day(start: NaiveDate, today: NaiveDate, epoch_ms: i64) -> Self {
        let days = u32::try_from((today - start).num_days()).unwrap_or(0);
        let level = ((days / 30) as usize).min(SKILL_LEVELS.len() - 1);
        let cycle = (days % CYCLE_DAYS) as usize;
        Self {
            days,
            skill_level: SKILL_LEVELS[level],
            technique: TECHNIQUES[cycle % TECHNIQUES.len()],
            scenario: SCENARIOS[cycle % SCENARIOS.len()],
            industry: INDUSTRIES[cycle % INDUSTRIES.len()],
            emerging_trend: EMERGING_TRENDS[cycle % EMERGING_TRENDS.len()],
            complexity: (1.0 + f64::from(days) / 100.0).min(3.0),
            next_milestone: MILESTONES.iter().copied().find(|m| *m > days),
            session_id: format!("{}_{}", days, epoch_ms),
        }
    }

    /// The block appended to the prompt.
    pub fn render(&self) -> String {
        let milestone = self
            .next_milestone
            .map(|m| format!("day {}", m))
            .unwrap_or_else(|| "all milestones reached".to_string());
        format!(
            "PROGRESSION CONTEXT:\n\
             - Skill level: {}\n\
             - Technique focus: {}\n\
             - Scenario: {}\n\
             - Industry: {}\n\
             - Emerging trend: {}\n\
             - Complexity: {:.1}x\n\
             - Next milestone: {}\n\
             - Session: {}\n\n\
             Build on {} knowledge and introduce something not covered in earlier lessons. \
             This is day {} of the learning journey.",
            self.skill_level.to_uppercase(),
            spaced(self.technique),
            spaced(self.scenario),
            spaced(self.industry),
            spaced(self.emerging_trend),
            self.complexity,
            milestone,
            self.session_id,
            self.skill_level,
            self.days,
        )
    }
}

fn spaced(token: &str) -> String {
    token.replace('_', " ")
}
