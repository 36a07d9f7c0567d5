//! Chat-completion access for Lectern.
//!
//! [`CompletionDriver`] is the seam the generator talks to.
//! [`OpenRouterClient`] implements it over HTTP against any endpoint that
//! speaks the OpenAI chat-completions schema, and [`parse_completion`] is the
//! strict reply parser it uses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod driver;
mod dto;
mod parse;

pub use client::OpenRouterClient;
pub use driver::{CompletionDriver, CompletionParams};
pub use dto::{
    ChatChoice, ChatMessage, ChatMessageBuilder, ChatRequest, ChatRequestBuilder, ChatResponse,
    ChatRole, ChoiceMessage,
};
pub use parse::parse_completion;
