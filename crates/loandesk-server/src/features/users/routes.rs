//! User API routes
//!
//! # Route Structure
//!
//! - `GET /users` - List all users
//! - `POST /users` - Create a user
//! - `GET /users/:id` - Get a user by id
//! - `PUT /users/:id` - Update a user
//! - `DELETE /users/:id` - Delete a user
//!
//! Any other method on these paths answers `405`.

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
        shared::{commands, decode_request, path_id, queries, response, USERS},
        FeatureState,
    },
    models::Resource,
    store::Lookup,
};

/// Creates the users router
pub fn users_routes() -> Router<FeatureState> {
    Router::new()
        .route(
            "/",
            get(list_users)
                .post(create_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
}

/// Create a user
///
/// # Request Body
///
/// ```json
/// {
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "phone": "+44123456789",
///   "birth_date": "1815-12-10"
/// }
/// ```
///
/// `first_name` and `last_name` are required.
#[tracing::instrument(skip(state, headers, body))]
async fn create_user(
    State(state): State<FeatureState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let payload = decode_request(&headers, &body?)?;
    let row_id = commands::create(state.store.as_ref(), &USERS, &payload).await?;

    tracing::info!(row_id, "User created via API");

    Ok(response::created(Resource::User, row_id).into_response())
}

/// Update any subset of `first_name`, `last_name`, `phone`, `birth_date`
#[tracing::instrument(skip(state, path, headers, body), fields(id = tracing::field::Empty))]
async fn update_user(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let payload = decode_request(&headers, &body?)?;
    let execution = commands::update(state.store.as_ref(), &USERS, id, &payload).await?;

    tracing::info!(id, rows_affected = execution.rows_affected, "User updated via API");

    Ok(response::updated(Resource::User).into_response())
}

/// Delete a user. Fails while any loan still references the user.
#[tracing::instrument(skip(state, path), fields(id = tracing::field::Empty))]
async fn delete_user(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let execution = commands::delete(state.store.as_ref(), &USERS, id).await?;

    tracing::info!(id, rows_affected = execution.rows_affected, "User deleted via API");

    Ok(response::deleted(Resource::User, id).into_response())
}

#[tracing::instrument(skip(state, path), fields(id = tracing::field::Empty))]
async fn get_user(
    State(state): State<FeatureState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let rows = queries::fetch(state.store.as_ref(), Lookup::by_id(Resource::User, id)).await?;

    tracing::debug!(id, found = !rows.is_empty(), "User retrieved via API");

    Ok(response::rows(rows).into_response())
}

#[tracing::instrument(skip(state))]
async fn list_users(State(state): State<FeatureState>) -> Result<Response, ApiError> {
    let rows = queries::fetch(state.store.as_ref(), Lookup::all(Resource::User)).await?;

    tracing::debug!(count = rows.len(), "Users listed via API");

    Ok(response::rows(rows).into_response())
}
