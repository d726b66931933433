//! Loandesk Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the Loandesk workspace members.
//!
//! # Overview
//!
//! - **Logging**: tracing subscriber setup with console output and rotating
//!   access/error log files
//!
//! # Example
//!
//! ```no_run
//! use loandesk_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard};
