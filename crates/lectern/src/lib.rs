//! Lectern - scheduled lessons from a chat-completion API.
//!
//! Lectern asks an OpenAI-compatible endpoint for a lesson at fixed times of
//! day, writes it to `daily-lessons/<date>/`, and delivers it by email,
//! Discord, Telegram and local backup. When the endpoint is unreachable a
//! canned lesson is used instead, so every scheduled run produces a file.
//!
//! # Architecture
//!
//! - `lectern_error` - error types
//! - `lectern_core` - lesson kinds, requests, artifacts, delivery records
//! - `lectern_config` - `.env` settings and the TOML job schedule
//! - `lectern_storage` - dated markdown storage and statistics
//! - `lectern_models` - completion driver and OpenRouter client
//! - `lectern_generator` - prompts, progression context, fallback lessons
//! - `lectern_delivery` - sinks and concurrent fan-out
//! - `lectern_server` - PID lock, scheduler loop and run pipeline
//!
//! This crate re-exports all of them, and adds logging setup, the
//! configuration diagnostics and the setup wizard used by the `lectern` binary.

pub mod diagnostics;
pub mod observability;
pub mod setup;

pub use lectern_config::*;
pub use lectern_core::*;
pub use lectern_delivery::*;
pub use lectern_error::*;
pub use lectern_generator::*;
pub use lectern_models::*;
pub use lectern_server::*;
pub use lectern_storage::*;
