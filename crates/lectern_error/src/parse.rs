//! Errors raised when untrusted text cannot be turned into a structure.

/// Reasons a completion reply or stored lesson is unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ParseErrorKind {
    /// Body is not valid JSON of the expected shape
    #[display("Invalid JSON: {}", _0)]
    InvalidJson(String),
    /// The `choices` array is missing or empty
    #[display("Response contains no choices")]
    NoChoices,
    /// The first choice carries no message content
    #[display("First choice has no message content")]
    MissingContent,
    /// Content is present but blank
    #[display("Message content is blank")]
    BlankContent,
    /// A lesson file has no `---` delimited front matter
    #[display("Missing front matter")]
    MissingFrontMatter,
    /// A required front matter field is absent
    #[display("Missing field: {}", _0)]
    MissingField(String),
    /// A front matter field has an unusable value
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// The field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Parse error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Unparseable: {} at line {} in {}", kind, line, file)]
pub struct ParseError {
    kind: ParseErrorKind,
    line: u32,
    file: &'static str,
}

impl ParseError {
    /// Create a new parse error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ParseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}
