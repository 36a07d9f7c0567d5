//! Lesson artifacts and their on-disk markdown form.

use crate::{LessonKind, LessonRequest};
use chrono::{DateTime, Utc};
use lectern_error::{ParseError, ParseErrorKind};
use serde::{Deserialize, Serialize};

const FRONT_MATTER_DELIMITER: &str = "---";

const FOOTER: &str = "\n\n---\n\n\
## Implementation Checklist\n\n\
- [ ] Copy the example into a scratch project\n\
- [ ] Install whatever the example depends on\n\
- [ ] Adjust selectors and endpoints to your application\n\
- [ ] Run it against a development environment\n\
- [ ] Write down what changed and why\n\
- [ ] Share one takeaway with your team\n";

/// Where the body text of an artifact came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ArtifactSource {
    /// Produced by the completion API
    Remote {
        /// Model identifier
        model: String,
    },
    /// Canned lesson used after a failed remote call
    Fallback {
        /// Why the remote call was not used
        reason: String,
    },
}

impl ArtifactSource {
    /// Whether this artifact came from the canned library.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    fn render(&self) -> String {
        match self {
            Self::Remote { model } => format!("model:{model}"),
            Self::Fallback { reason } => format!("fallback:{reason}"),
        }
    }

    fn parse(value: &str) -> Result<Self, ParseError> {
        if let Some(model) = value.strip_prefix("model:") {
            Ok(Self::Remote {
                model: model.to_string(),
            })
        } else if let Some(reason) = value.strip_prefix("fallback:") {
            Ok(Self::Fallback {
                reason: reason.to_string(),
            })
        } else {
            Err(ParseError::new(ParseErrorKind::InvalidField {
                field: "source".to_string(),
                reason: format!("unknown source '{value}'"),
            }))
        }
    }
}

impl std::fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Metadata written as front matter at the top of every lesson file.
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
pub struct ArtifactHeader {
    /// Lesson title
    title: String,
    /// Lesson kind
    kind: LessonKind,
    /// Prompt focus
    #[builder(default)]
    focus: String,
    /// When the artifact was produced
    generated: DateTime<Utc>,
    /// Difficulty label
    difficulty: String,
    /// Estimated duration label
    duration: String,
    /// Topic tags
    #[builder(default)]
    tags: Vec<String>,
    /// Remote model or fallback
    source: ArtifactSource,
}

impl ArtifactHeader {
    /// Creates a new header builder.
    pub fn builder() -> ArtifactHeaderBuilder {
        ArtifactHeaderBuilder::default()
    }

    /// Header for `request`, with difficulty and duration taken from its kind.
    pub fn for_request(
        request: &LessonRequest,
        generated: DateTime<Utc>,
        tags: Vec<String>,
        source: ArtifactSource,
    ) -> Self {
        Self {
            title: request.title().clone(),
            kind: request.kind().clone(),
            focus: request.focus().clone(),
            generated,
            difficulty: request.kind().difficulty().to_string(),
            duration: request.kind().estimated_duration().to_string(),
            tags,
            source,
        }
    }
}

/// A generated lesson: header plus markdown body.
///
/// Written once to disk by the storage layer and never mutated.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use lectern_core::{ArtifactHeader, ArtifactSource, LessonArtifact, LessonKind, LessonRequest};
///
/// let request = LessonRequest::new(LessonKind::Expert, "Only PRO Can Do", "master_level");
/// let header = ArtifactHeader::for_request(
///     &request,
///     Utc::now(),
///     vec!["rust".to_string()],
///     ArtifactSource::Fallback { reason: "offline".to_string() },
/// );
/// let artifact = LessonArtifact::new(header, "## Body\n\nText.");
///
/// let markdown = artifact.to_markdown();
/// let parsed = LessonArtifact::parse(&markdown).unwrap();
/// assert_eq!(parsed, artifact);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct LessonArtifact {
    /// Front matter
    header: ArtifactHeader,
    /// Lesson markdown without the decorations added by [`LessonArtifact::to_markdown`]
    body: String,
}

impl LessonArtifact {
    /// Pairs a header with a body.
    pub fn new(header: ArtifactHeader, body: impl Into<String>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    /// The first `max_chars` characters of the body, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.body.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.body[..idx]),
            None => self.body.clone(),
        }
    }

    /// The `##` section headings of the body, in order.
    pub fn outline(&self) -> Vec<&str> {
        self.body
            .lines()
            .filter_map(|line| line.strip_prefix("## "))
            .map(str::trim)
            .collect()
    }

    /// Renders the full lesson file.
    pub fn to_markdown(&self) -> String {
        let h = &self.header;
        let mut out = String::new();
        out.push_str(FRONT_MATTER_DELIMITER);
        out.push('\n');
        push_field(&mut out, "title", &quote(&h.title));
        push_field(&mut out, "type", &quote(&h.kind.to_string()));
        push_field(&mut out, "focus", &quote(&h.focus));
        push_field(&mut out, "generated", &quote(&h.generated.to_rfc3339()));
        push_field(&mut out, "difficulty", &quote(&h.difficulty));
        push_field(&mut out, "duration", &quote(&h.duration));
        push_field(
            &mut out,
            "tags",
            &serde_json::to_string(&h.tags).unwrap_or_else(|_| "[]".to_string()),
        );
        push_field(&mut out, "source", &quote(&h.source.render()));
        out.push_str(FRONT_MATTER_DELIMITER);
        out.push_str("\n\n");
        out.push_str(&format!("# {}\n\n", h.title));
        out.push_str(&format!(
            "*Generated on {}*\n\n",
            h.generated.format("%Y-%m-%d")
        ));
        out.push_str(&self.body);
        out.push_str(FOOTER);
        out
    }

    /// Reads a lesson file written by [`LessonArtifact::to_markdown`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::MissingFrontMatter`] when the file does not
    /// open with a `---` block, [`ParseErrorKind::MissingField`] when a header
    /// field is absent, and [`ParseErrorKind::InvalidField`] when a value
    /// cannot be decoded.
    pub fn parse(markdown: &str) -> Result<Self, ParseError> {
        let rest = markdown
            .strip_prefix("---\n")
            .ok_or_else(|| ParseError::new(ParseErrorKind::MissingFrontMatter))?;
        let end = rest
            .find("\n---\n")
            .ok_or_else(|| ParseError::new(ParseErrorKind::MissingFrontMatter))?;
        let front = &rest[..end];
        let document = &rest[end + "\n---\n".len()..];

        let fields: Vec<(&str, &str)> = front
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split_once(':')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .ok_or_else(|| {
                        ParseError::new(ParseErrorKind::InvalidField {
                            field: line.to_string(),
                            reason: "expected 'key: value'".to_string(),
                        })
                    })
            })
            .collect::<Result<_, _>>()?;

        let raw = |name: &str| -> Result<&str, ParseError> {
            fields
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| ParseError::new(ParseErrorKind::MissingField(name.to_string())))
        };
        let text = |name: &str| -> Result<String, ParseError> { unquote(name, raw(name)?) };

        let title = text("title")?;
        let kind_name = text("type")?;
        let Ok(kind) = kind_name.parse::<LessonKind>();
        let generated_raw = text("generated")?;
        let generated = DateTime::parse_from_rfc3339(&generated_raw)
            .map_err(|e| {
                ParseError::new(ParseErrorKind::InvalidField {
                    field: "generated".to_string(),
                    reason: e.to_string(),
                })
            })?
            .with_timezone(&Utc);
        let tags: Vec<String> = serde_json::from_str(raw("tags")?).map_err(|e| {
            ParseError::new(ParseErrorKind::InvalidField {
                field: "tags".to_string(),
                reason: e.to_string(),
            })
        })?;

        let header = ArtifactHeader {
            focus: text("focus")?,
            difficulty: text("difficulty")?,
            duration: text("duration")?,
            source: ArtifactSource::parse(&text("source")?)?,
            generated,
            tags,
            kind,
            title,
        };

        let body = strip_decorations(document, &header.title);
        Ok(Self { header, body })
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn unquote(field: &str, value: &str) -> Result<String, ParseError> {
    serde_json::from_str::<String>(value).map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidField {
            field: field.to_string(),
            reason: e.to_string(),
        })
    })
}

fn strip_decorations(document: &str, title: &str) -> String {
    let mut body = document.trim_start_matches('\n');
    let heading = format!("# {title}\n");
    if let Some(rest) = body.strip_prefix(heading.as_str()) {
        body = rest.trim_start_matches('\n');
    }
    if body.starts_with("*Generated on ") {
        body = body
            .split_once('\n')
            .map(|(_, rest)| rest.trim_start_matches('\n'))
            .unwrap_or("");
    }
    body.strip_suffix(FOOTER).unwrap_or(body).to_string()
}
