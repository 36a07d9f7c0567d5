//! Message bodies for each destination.

use chrono::{DateTime, Utc};
use lectern_core::LessonArtifact;
use lectern_storage::LessonEntry;
use serde_json::{Value, json};
use std::path::Path;

const EMAIL_PREVIEW_CHARS: usize = 500;
const DISCORD_PREVIEW_CHARS: usize = 300;
const TELEGRAM_PREVIEW_CHARS: usize = 200;
const DISCORD_COLOR: u32 = 0x00AE86;
const CONCEPTS_PER_LESSON: usize = 3;

/// Escapes text for inclusion in HTML.
///
/// # Examples
///
/// ```
/// use lectern_delivery::escape_html;
///
/// assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// The lesson email body: header, a preview of the first 500 characters, and the saved path.
pub fn email_html(artifact: &LessonArtifact, path: &Path) -> String {
    let h = artifact.header();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
.card {{ max-width: 640px; margin: 0 auto; background: #fff; border-radius: 8px; padding: 20px; }}
.header {{ background: #4c51bf; color: #fff; padding: 16px 20px; border-radius: 8px 8px 0 0; margin: -20px -20px 20px -20px; }}
.meta {{ color: #555; font-size: 14px; }}
.preview {{ white-space: pre-wrap; line-height: 1.5; color: #333; border-left: 3px solid #4c51bf; padding-left: 12px; }}
.footer {{ margin-top: 24px; font-size: 12px; color: #777; }}
</style>
</head>
<body>
<div class="card">
<div class="header"><h1>{title}</h1><p>Your {kind} lesson is ready</p></div>
<p class="meta"><strong>Difficulty:</strong> {difficulty} &middot; <strong>Time:</strong> {duration} &middot; <strong>Focus:</strong> {focus}</p>
<div class="preview">{preview}</div>
<p>The full lesson is attached as <code>lesson.md</code> and saved at <code>{path}</code>.</p>
<div class="footer">Generated {generated} by Lectern</div>
</div>
</body>
</html>
"#,
        title = escape_html(h.title()),
        kind = escape_html(&h.kind().to_string()),
        difficulty = escape_html(h.difficulty()),
        duration = escape_html(h.duration()),
        focus = escape_html(h.focus()),
        preview = escape_html(&artifact.preview(EMAIL_PREVIEW_CHARS)),
        path = escape_html(&path.display().to_string()),
        generated = h.generated().format("%Y-%m-%d %H:%M UTC"),
    )
}

/// The Discord webhook payload: one embed with a 300 character preview.
pub fn discord_payload(artifact: &LessonArtifact, focus_areas: &str) -> Value {
    let h = artifact.header();
    json!({
        "username": "Lectern",
        "embeds": [{
            "title": h.title(),
            "description": artifact.preview(DISCORD_PREVIEW_CHARS),
            "color": DISCORD_COLOR,
            "fields": [
                { "name": "Lesson Type", "value": h.kind().to_string(), "inline": true },
                { "name": "Difficulty", "value": h.difficulty(), "inline": true },
                { "name": "Focus Areas", "value": focus_areas, "inline": true },
            ],
            "footer": { "text": "Lectern daily lessons" },
            "timestamp": h.generated().to_rfc3339(),
        }]
    })
}

/// The embed posted by `lectern check` to confirm a Discord webhook works.
pub(crate) fn discord_test_payload(now: DateTime<Utc>) -> Value {
    json!({
        "username": "Lectern",
        "embeds": [{
            "title": "Discord connection test",
            "description": "Lectern can post to this channel. Lesson notifications will appear here.",
            "color": DISCORD_COLOR,
            "fields": [
                { "name": "Status", "value": "Webhook working", "inline": true },
                { "name": "Checked", "value": now.format("%Y-%m-%d").to_string(), "inline": true },
            ],
            "footer": { "text": "Lectern daily lessons" },
            "timestamp": now.to_rfc3339(),
        }]
    })
}

/// The message sent by `lectern check` to confirm a Telegram bot works.
pub(crate) const TELEGRAM_TEST_TEXT: &str =
    "*Telegram connection test*\n\nLectern can message this chat. Lesson notifications will appear here.";

/// The Telegram message text, Markdown formatted, with a 200 character preview.
pub fn telegram_text(artifact: &LessonArtifact, focus_areas: &str) -> String {
    let h = artifact.header();
    format!(
        "*{}*\n\nType: {}\nDifficulty: {}\nFocus: {}\n\n{}\n\nThe full lesson is in your inbox and under daily-lessons/.",
        h.title(),
        h.kind(),
        h.difficulty(),
        focus_areas,
        artifact.preview(TELEGRAM_PREVIEW_CHARS),
    )
}

/// The weekly summary email body.
pub fn weekly_summary_html(lessons: &[LessonEntry], generated: DateTime<Utc>) -> String {
    let items: String = lessons
        .iter()
        .map(|lesson| {
            format!(
                "<li><strong>{}</strong> <small>{}</small></li>\n",
                escape_html(lesson.name()),
                lesson.modified().format("%Y-%m-%d"),
            )
        })
        .collect();
    let list = if items.is_empty() {
        "<p>No lessons this week.</p>".to_string()
    } else {
        format!("<ul>\n{}</ul>", items)
    };
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2>Your week of learning</h2>
<ul>
<li><strong>{count}</strong> lessons received</li>
<li><strong>{concepts}+</strong> concepts covered</li>
</ul>
<h3>Lessons</h3>
{list}
<p style="color: #777; font-size: 12px;">Summary generated {generated}</p>
</div>
"#,
        count = lessons.len(),
        concepts = lessons.len() * CONCEPTS_PER_LESSON,
        list = list,
        generated = generated.format("%Y-%m-%d %H:%M UTC"),
    )
}

pub(crate) fn weekly_summary_markdown(lessons: &[LessonEntry], generated: DateTime<Utc>) -> String {
    let mut out = format!(
        "# Weekly Summary\n\n*Generated {}*\n\n- Lessons: {}\n- Concepts covered: {}+\n\n## Lessons\n\n",
        generated.format("%Y-%m-%d %H:%M UTC"),
        lessons.len(),
        lessons.len() * CONCEPTS_PER_LESSON,
    );
    if lessons.is_empty() {
        out.push_str("No lessons this week.\n");
    }
    for lesson in lessons {
        out.push_str(&format!(
            "- {} ({})\n",
            lesson.name(),
            lesson.modified().format("%Y-%m-%d")
        ));
    }
    out
}

pub(crate) fn desktop_notice(
    artifact: &LessonArtifact,
    path: &Path,
    error: &str,
    now: DateTime<Utc>,
) -> String {
    let h = artifact.header();
    format!(
        "Lectern lesson ready\n\
         ====================\n\n\
         Title: {}\n\
         Type: {}\n\
         File: {}\n\
         Time: {}\n\n\
         Email delivery failed: {}\n\
         Run `lectern check` to diagnose the mail settings.\n",
        h.title(),
        h.kind(),
        path.display(),
        now.to_rfc3339(),
        error,
    )
}
