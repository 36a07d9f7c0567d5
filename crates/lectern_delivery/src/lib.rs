//! Lesson delivery.
//!
//! A [`FanOut`] hands one saved lesson to every [`Sink`] at once and reports a
//! [`DeliveryRecord`](lectern_core::DeliveryRecord) per sink. Unconfigured
//! sinks are skipped without being attempted, and a failing sink never
//! affects the others.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod email;
mod fanout;
mod mail;
mod render;
mod sink;
mod summary;
mod webhook;

pub use backup::BackupSink;
pub use email::EmailSink;
pub use fanout::FanOut;
pub use mail::{MailAttachment, MailMessage, MailMessageBuilder, MailTransport, SmtpMailer};
pub use render::{discord_payload, email_html, escape_html, telegram_text, weekly_summary_html};
pub use sink::Sink;
pub use summary::{WeeklySummary, WeeklySummaryReport};
pub use webhook::{DiscordSink, TelegramSink, is_discord_webhook_url};
