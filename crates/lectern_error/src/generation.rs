//! Lesson generation error types.

use crate::ParseErrorKind;

/// Specific reasons a remote lesson generation did not produce content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// No usable API key is configured
    #[display("API key is not configured")]
    MissingApiKey,
    /// The request never reached the server or the connection broke
    #[display("Request failed: {}", _0)]
    Transport(String),
    /// The request timed out
    #[display("Request timed out after {}s", _0)]
    Timeout(u64),
    /// The server answered with a non-success status
    #[display("API request failed: {} {}", status, body)]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// The reply could not be parsed into lesson content
    #[display("Unparseable reply: {}", _0)]
    Unparseable(ParseErrorKind),
}

impl GenerationErrorKind {
    /// Whether the same request might succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey | Self::Unparseable(_) => false,
        }
    }
}

/// Generation error with location tracking.
///
/// # Examples
///
/// ```
/// use lectern_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Status {
///     status: 503,
///     body: String::new(),
/// });
/// assert!(err.kind().is_transient());
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    kind: GenerationErrorKind,
    line: u32,
    file: &'static str,
}

impl GenerationError {
    /// Create a new generation error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GenerationErrorKind {
        &self.kind
    }
}

impl From<crate::ParseError> for GenerationError {
    #[track_caller]
    fn from(err: crate::ParseError) -> Self {
        Self::new(GenerationErrorKind::Unparseable(err.kind().clone()))
    }
}
