//! Read pipeline shared by every resource

use super::classify::internal_failure;
use crate::{
    error::ApiError,
    store::{Lookup, Row, Store},
};

/// Fetch rows for a lookup. Store failures on reads are never classified.
pub async fn fetch(store: &dyn Store, lookup: Lookup) -> Result<Vec<Row>, ApiError> {
    store
        .fetch(lookup)
        .await
        .map_err(|err| internal_failure(None, &err))
}
