//! Loan management
//!
//! Loan reads include the owning user's columns and are ordered by
//! `create_time`, then `amount`.

pub mod routes;

pub use routes::loans_routes;
