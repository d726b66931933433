//! Loandesk Server Library
//!
//! JSON HTTP API managing borrowers (`users`) and their `loans` in a
//! relational store.
//!
//! # Overview
//!
//! Every mutating request flows through one pipeline:
//!
//! 1. **Decode** the body into a flat payload ([`features::shared::payload`])
//! 2. **Build** a parameterized mutation from the resource's field policy
//!    ([`features::shared::mutation`])
//! 3. **Execute** it against the injected [`store::Store`]
//! 4. **Classify** store failures into domain errors
//!    ([`features::shared::classify`])
//! 5. **Format** a uniform JSON envelope ([`api::response::Envelope`])
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access with parameterized statements
//! - **Tower**: Middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use loandesk_server::{api, config::Config, store::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config, Arc::new(MemoryStore::new())).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod store;

pub use error::{ApiError, ApiResult};
