//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the lectern binary.

mod commands;
mod daemon;
mod lessons;
mod setup;

pub use commands::{Cli, Commands};
pub use daemon::{handle_start, handle_status, handle_stop};
pub use lessons::{handle_archive, handle_generate, handle_report};
pub use setup::{handle_check, handle_set_api_key, handle_setup};
