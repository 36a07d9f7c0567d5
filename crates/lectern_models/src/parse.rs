//! Strict completion reply parsing.

use crate::ChatResponse;
use lectern_error::{ParseError, ParseErrorKind};

/// Extracts `choices[0].message.content` from a completion reply body.
///
/// Surrounding whitespace is trimmed from the content.
///
/// # Errors
///
/// - [`ParseErrorKind::InvalidJson`] when the body is not a JSON object of the expected shape
/// - [`ParseErrorKind::NoChoices`] when `choices` is absent or empty
/// - [`ParseErrorKind::MissingContent`] when the first choice has no message content
/// - [`ParseErrorKind::BlankContent`] when the content is only whitespace
///
/// # Examples
///
/// ```
/// use lectern_models::parse_completion;
///
/// let body = r#"{"choices":[{"message":{"role":"assistant","content":" Hello "}}]}"#;
/// assert_eq!(parse_completion(body).unwrap(), "Hello");
///
/// assert!(parse_completion(r#"{"choices":[]}"#).is_err());
/// ```
pub fn parse_completion(body: &str) -> Result<String, ParseError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ParseError::new(ParseErrorKind::InvalidJson(e.to_string())))?;

    let choice = response
        .choices()
        .first()
        .ok_or_else(|| ParseError::new(ParseErrorKind::NoChoices))?;

    let content = choice
        .message()
        .as_ref()
        .and_then(|m| m.content().as_deref())
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingContent))?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(ParseErrorKind::BlankContent));
    }
    Ok(trimmed.to_string())
}
