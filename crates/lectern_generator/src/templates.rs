//! Prompt and fallback lesson templates.

use lectern_core::LessonKind;

const SERIES_PROMPT: &str = include_str!("../templates/prompts/series.txt");
const PRO_TIP_PROMPT: &str = include_str!("../templates/prompts/pro-tip.txt");
const KNOWLEDGE_PROMPT: &str = include_str!("../templates/prompts/knowledge.txt");
const AI_PROMPT: &str = include_str!("../templates/prompts/ai-implementation.txt");
const EXPERT_PROMPT: &str = include_str!("../templates/prompts/expert.txt");

const SERIES_FALLBACK: &str = include_str!("../templates/fallback/series.md");
const PRO_TIP_FALLBACK: &str = include_str!("../templates/fallback/pro-tip.md");
const KNOWLEDGE_FALLBACK: &str = include_str!("../templates/fallback/knowledge.md");
const AI_FALLBACK: &str = include_str!("../templates/fallback/ai-implementation.md");
const EXPERT_FALLBACK: &str = include_str!("../templates/fallback/expert.md");
const WELCOME_FALLBACK: &str = include_str!("../templates/fallback/welcome.md");

/// Placeholder replaced by the request title in fallback lessons.
pub const TITLE_PLACEHOLDER: &str = "{{TITLE}}";
const FOCUS_PLACEHOLDER: &str = "{{FOCUS}}";
const STATUS_PLACEHOLDER: &str = "{{STATUS}}";
const NEXT_STEPS_PLACEHOLDER: &str = "{{NEXT_STEPS}}";

/// The raw prompt template for `kind`. Kinds without their own prompt use the series prompt.
pub fn prompt_template(kind: &LessonKind) -> &'static str {
    match kind {
        LessonKind::ProTip => PRO_TIP_PROMPT,
        LessonKind::Knowledge => KNOWLEDGE_PROMPT,
        LessonKind::AiImplementation => AI_PROMPT,
        LessonKind::Expert => EXPERT_PROMPT,
        _ => SERIES_PROMPT,
    }
}

pub(crate) fn render_prompt(kind: &LessonKind, focus: &str) -> String {
    let focus = if focus.trim().is_empty() {
        "practical automation skills"
    } else {
        focus
    };
    prompt_template(kind).replace(FOCUS_PLACEHOLDER, focus)
}

/// Which parts of the system were configured when the welcome lesson was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WelcomeStatus {
    /// SMTP credentials present
    pub email_ready: bool,
    /// Completion API key present
    pub api_ready: bool,
}

impl WelcomeStatus {
    fn status_block(&self) -> &'static str {
        match (self.email_ready, self.api_ready) {
            (true, true) => {
                "## System Status: Ready\n\n\
                 - **Email notifications**: configured\n\
                 - **Lesson generation**: live\n\
                 - **Schedule**: active"
            }
            (true, false) => {
                "## System Status: Email Ready, Generation Offline\n\n\
                 - **Email notifications**: configured\n\
                 - **Lesson generation**: using the built-in lesson library\n\
                 - **Schedule**: active"
            }
            _ => {
                "## System Status: Setup In Progress\n\n\
                 Some settings are still missing. Lessons will keep arriving from the built-in library meanwhile."
            }
        }
    }

    fn next_steps(&self) -> &'static str {
        if self.email_ready {
            "- Lessons arrive in your inbox on the schedule above\n\
             - Every lesson is also saved under `daily-lessons/`\n\
             - Run `lectern status` any time to see what the daemon is doing"
        } else {
            "- Create a Gmail app password at https://myaccount.google.com/apppasswords\n\
             - Put the 16-character password in `EMAIL_APP_PASSWORD`\n\
             - Run `lectern check` to confirm everything works"
        }
    }
}

/// The canned lesson body for `kind`.
///
/// `{{TITLE}}` is replaced by `title`. The welcome lesson carries a status
/// block instead of a title. Kinds without their own lesson use the series lesson.
///
/// # Examples
///
/// ```
/// use lectern_core::LessonKind;
/// use lectern_generator::{WelcomeStatus, fallback_body};
///
/// let body = fallback_body(&LessonKind::ProTip, "Test Title", WelcomeStatus::default());
/// assert!(body.starts_with("# Test Title:"));
/// assert!(!body.contains("{{TITLE}}"));
/// ```
pub fn fallback_body(kind: &LessonKind, title: &str, status: WelcomeStatus) -> String {
    match kind {
        LessonKind::Welcome => WELCOME_FALLBACK
            .replace(STATUS_PLACEHOLDER, status.status_block())
            .replace(NEXT_STEPS_PLACEHOLDER, status.next_steps()),
        other => fallback_template(other).replace(TITLE_PLACEHOLDER, title),
    }
}

pub(crate) fn fallback_template(kind: &LessonKind) -> &'static str {
    match kind {
        LessonKind::ProTip => PRO_TIP_FALLBACK,
        LessonKind::Knowledge => KNOWLEDGE_FALLBACK,
        LessonKind::AiImplementation => AI_FALLBACK,
        LessonKind::Expert => EXPERT_FALLBACK,
        LessonKind::Welcome => WELCOME_FALLBACK,
        _ => SERIES_FALLBACK,
    }
}
