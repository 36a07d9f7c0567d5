//! Delivery sink error types.

/// Specific delivery failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DeliveryErrorKind {
    /// The email message could not be assembled
    #[display("Failed to build message: {}", _0)]
    MessageBuild(String),
    /// The SMTP session failed
    #[display("SMTP failure: {}", _0)]
    Smtp(String),
    /// The webhook request never got a response
    #[display("Webhook request failed: {}", _0)]
    Transport(String),
    /// The webhook endpoint rejected the payload
    #[display("Webhook returned status {}", _0)]
    Rejected(u16),
    /// Reading the lesson file or writing a fallback failed
    #[display("File I/O failed: {}", _0)]
    Io(String),
}

impl DeliveryErrorKind {
    /// Whether the same send might succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Smtp(_) => true,
            Self::Rejected(status) => *status == 429 || *status >= 500,
            Self::MessageBuild(_) | Self::Io(_) => false,
        }
    }
}

/// Delivery error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Delivery Error: {} at line {} in {}", kind, line, file)]
pub struct DeliveryError {
    kind: DeliveryErrorKind,
    line: u32,
    file: &'static str,
}

impl DeliveryError {
    /// Create a new delivery error with caller location tracking.
    #[track_caller]
    pub fn new(kind: DeliveryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DeliveryErrorKind {
        &self.kind
    }
}

impl From<std::io::Error> for DeliveryError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(DeliveryErrorKind::Io(err.to_string()))
    }
}
