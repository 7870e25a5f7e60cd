//! Core logging + configuration for the Marmot Telegram bot.
//!
//! The engineered center of this crate is the `logging` module: a
//! process-wide logging context with rotating file sinks, a colorized
//! console sink and instrumentation wrappers for command/event entry points.
//! Transport adapters (Telegram, etc.) live in separate crates and log
//! through handles obtained here.

pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{Error, Result};
