//! Loan API routes
//!
//! # Route Structure
//!
//! - `GET /loans` - List all loans with their owners
//! - `POST /loans` - Create a loan
//! - `GET /loans/:id` - Get a loan by id
//! - `PUT /loans/:id` - Update a loan
//! - `DELETE /loans/:id` - Delete a loan

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::{
    api::method_not_allowed,
    error::ApiError,
    features::{
        shared::{commands, decode_request, path_id, queries, response, LOANS},
        FeatureState,
    },
    models::Resource,
    store::Lookup,
};

/// Creates the loans router
pub fn loans_routes() -> Router<FeatureState> {
    Router::new()
        .route(
            "/",
            get(list_loans)
                .post(create_loan)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_loan)
                .put(update_loan)
                .delete(delete_loan)
                .fallback(method_not_allowed),
        )
}

/// Create a loan
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": 1,
///   "amount": 2500,
///   "pay_time": 1767225600,
///   "create_time": 1735689600
/// }
/// ```
///
/// `user_id`, `amount` and `pay_time` are required; `create_time` defaults to
/// now. Integer fields accept numeric strings.
#[tracing::instrument(skip(state, headers, body))]
async fn create_loan(
    State(state): State<FeatureState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let payload = decode_request(&headers, &body?)?;
    let row_id = commands::create(state.store.as_ref(), &LOANS, &payload).await?;

    tracing::info!(row_id, "Loan created via API");

    Ok(response::created(Resource::Loan, row_id).into_response())
}

#[tracing::instrument(skip(state, path, headers, body), fields(id = tracing::field::Empty))]
async fn update_loan(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let payload = decode_request(&headers, &body?)?;
    let execution = commands::update(state.store.as_ref(), &LOANS, id, &payload).await?;

    tracing::info!(id, rows_affected = execution.rows_affected, "Loan updated via API");

    Ok(response::updated(Resource::Loan).into_response())
}

#[tracing::instrument(skip(state, path), fields(id = tracing::field::Empty))]
async fn delete_loan(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let execution = commands::delete(state.store.as_ref(), &LOANS, id).await?;

    tracing::info!(id, rows_affected = execution.rows_affected, "Loan deleted via API");

    Ok(response::deleted(Resource::Loan, id).into_response())
}

#[tracing::instrument(skip(state, path), fields(id = tracing::field::Empty))]
async fn get_loan(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let rows = queries::fetch(state.store.as_ref(), Lookup::by_id(Resource::Loan, id)).await?;

    tracing::debug!(id, found = !rows.is_empty(), "Loan retrieved via API");

    Ok(response::rows(rows).into_response())
}

#[tracing::instrument(skip(state))]
async fn list_loans(State(state): State<FeatureState>) -> Result<Response, ApiError> {
    let rows = queries::fetch(state.store.as_ref(), Lookup::all(Resource::Loan)).await?;

    tracing::debug!(count = rows.len(), "Loans listed via API");

    Ok(response::rows(rows).into_response())
}
