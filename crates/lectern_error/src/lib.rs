//! Error types for the Lectern lesson scheduler.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with the source location that raised it
//! - constructors are `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use lectern_error::{ConfigError, LecternResult};
//!
//! fn load() -> LecternResult<String> {
//!     Err(ConfigError::new("EMAIL_USER is not set"))?
//! }
//!
//! let err = load().unwrap_err();
//! assert!(format!("{}", err).contains("EMAIL_USER"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod daemon;
mod delivery;
mod error;
mod generation;
mod http;
mod parse;
mod storage;

pub use config::ConfigError;
pub use daemon::{DaemonError, DaemonErrorKind};
pub use delivery::{DeliveryError, DeliveryErrorKind};
pub use error::{LecternError, LecternErrorKind, LecternResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::HttpError;
pub use parse::{ParseError, ParseErrorKind};
pub use storage::{StorageError, StorageErrorKind};
