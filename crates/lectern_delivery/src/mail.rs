//! Mail messages and SMTP submission.

use async_trait::async_trait;
use lectern_error::{DeliveryError, DeliveryErrorKind};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, instrument};

/// SMTP command timeout.
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    /// File name shown to the recipient
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// Raw content
    pub body: Vec<u8>,
}

/// One outgoing HTML email.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct MailMessage {
    /// Sender address
    from: String,
    /// Recipient address
    to: String,
    /// Subject line
    subject: String,
    /// HTML body
    html: String,
    /// Optional attachment
    #[builder(default)]
    attachment: Option<MailAttachment>,
}

impl MailMessage {
    /// Creates a new builder.
    pub fn builder() -> MailMessageBuilder {
        MailMessageBuilder::default()
    }

    fn to_lettre(&self) -> Result<Message, DeliveryError> {
        let from: Mailbox = self.from.parse().map_err(|e| build_error("sender", e))?;
        let to: Mailbox = self.to.parse().map_err(|e| build_error("recipient", e))?;
        let html = SinglePart::html(self.html.clone());
        let builder = Message::builder().from(from).to(to).subject(self.subject.clone());

        let message = match &self.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| build_error("content type", e))?;
                builder.multipart(
                    MultiPart::mixed().singlepart(html).singlepart(
                        Attachment::new(attachment.file_name.clone())
                            .body(attachment.body.clone(), content_type),
                    ),
                )
            }
            None => builder.singlepart(html),
        };
        message.map_err(|e| build_error("message", e))
    }
}

fn build_error(what: &str, err: impl std::fmt::Display) -> DeliveryError {
    DeliveryError::new(DeliveryErrorKind::MessageBuild(format!(
        "invalid {}: {}",
        what, err
    )))
}

/// Something that can submit mail.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submits one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is malformed or the server refuses it.
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError>;

    /// Connects and authenticates without sending anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached or rejects the login.
    async fn verify(&self) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP submission over implicit TLS.
///
/// A fresh session is opened for every call; nothing is pooled.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    user: String,
    password: String,
    timeout: Duration,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Creates a mailer for `host` with login credentials.
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            timeout: SMTP_TIMEOUT,
        }
    }

    /// Overrides the command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A mailer from settings, or `None` when credentials are missing.
    pub fn from_settings(settings: &lectern_config::Settings) -> Option<Self> {
        match (settings.email_user(), settings.email_app_password()) {
            (Some(user), Some(password)) => Some(Self::new(
                settings.smtp_host().clone(),
                user.clone(),
                password.replace(' ', ""),
            )),
            _ => None,
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Smtp(e.to_string())))?
            .credentials(Credentials::new(self.user.clone(), self.password.clone()))
            .timeout(Some(self.timeout))
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    #[instrument(skip(self, message), fields(host = %self.host, to = %message.to))]
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        let email = message.to_lettre()?;
        let response = self
            .transport()?
            .send(email)
            .await
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Smtp(e.to_string())))?;
        debug!(code = %response.code(), "SMTP accepted message");
        Ok(())
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn verify(&self) -> Result<(), DeliveryError> {
        let ok = self
            .transport()?
            .test_connection()
            .await
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Smtp(e.to_string())))?;
        if ok {
            Ok(())
        } else {
            Err(DeliveryError::new(DeliveryErrorKind::Smtp(format!(
                "{} refused the connection",
                self.host
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_multipart_message() {
        let message = MailMessage::builder()
            .from("me@example.com")
            .to("you@example.com")
            .subject("Lesson")
            .html("<p>hi</p>")
            .attachment(Some(MailAttachment {
                file_name: "lesson.md".to_string(),
                content_type: "text/markdown; charset=utf-8".to_string(),
                body: b"# Lesson".to_vec(),
            }))
            .build()
            .unwrap();
        let formatted = String::from_utf8(message.to_lettre().unwrap().formatted()).unwrap();
        assert!(formatted.contains("lesson.md"));
        assert!(formatted.contains("Subject: Lesson"));
    }

    #[test]
    fn bad_address_is_build_error() {
        let message = MailMessage::builder()
            .from("not an address")
            .to("you@example.com")
            .subject("x")
            .html("x")
            .build()
            .unwrap();
        let err = message.to_lettre().unwrap_err();
        assert!(matches!(err.kind(), DeliveryErrorKind::MessageBuild(_)));
    }
}
