//! Feature modules implementing the loandesk API
//!
//! Each resource is a vertical slice with its own `routes.rs`. Both slices
//! drive the same request-to-mutation pipeline in [`shared`]:
//!
//! - `Decode` - [`shared::payload`]
//! - `Validate/Build` - [`shared::mutation`] over [`shared::policy`] tables
//! - `Execute` - the injected [`Store`]
//! - `Classify` - [`shared::classify`], on failure
//! - `Format` - [`shared::response`] / [`ApiError`](crate::error::ApiError)
//!
//! # Features
//!
//! - **users**: Borrower records
//! - **loans**: Loans owned by users

pub mod loans;
pub mod shared;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::store::Store;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Relational store every handler executes against
    pub store: Arc<dyn Store>,
}

impl FeatureState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Creates the router with all feature routes mounted
///
/// - `/users` - User management
/// - `/loans` - Loan management
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/users", users::users_routes())
        .nest("/loans", loans::loans_routes())
        .with_state(state)
}
