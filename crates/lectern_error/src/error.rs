//! Top-level error wrapper types.

use crate::{
    ConfigError, DaemonError, DeliveryError, GenerationError, HttpError, ParseError, StorageError,
};

/// Every error a Lectern crate can surface.
///
/// # Examples
///
/// ```
/// use lectern_error::{HttpError, LecternError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: LecternError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LecternErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Lesson storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Remote generation error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Unparseable text
    #[from(ParseError)]
    Parse(ParseError),
    /// Delivery sink error
    #[from(DeliveryError)]
    Delivery(DeliveryError),
    /// Daemon lifecycle error
    #[from(DaemonError)]
    Daemon(DaemonError),
}

/// Lectern error with kind discrimination.
///
/// # Examples
///
/// ```
/// use lectern_error::{ConfigError, LecternErrorKind, LecternResult};
///
/// fn might_fail() -> LecternResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), LecternErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lectern Error: {}", _0)]
pub struct LecternError(Box<LecternErrorKind>);

impl LecternError {
    /// Create a new error from a kind.
    pub fn new(kind: LecternErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LecternErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to LecternErrorKind
impl<T> From<T> for LecternError
where
    T: Into<LecternErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Lectern operations.
pub type LecternResult<T> = std::result::Result<T, LecternError>;
