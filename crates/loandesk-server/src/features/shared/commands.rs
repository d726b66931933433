//! Write pipeline shared by every resource
//!
//! payload → [`mutation`](super::mutation) → [`Store::execute`] →
//! [`classify`](super::classify) on failure.

use tracing::debug;

use super::{
    classify::{classify, internal_failure},
    mutation::{build_delete, build_insert, build_update},
    payload::Payload,
    policy::ResourcePolicy,
};
use crate::{
    error::ApiError,
    models::RowId,
    store::{Execution, Mutation, Store, StoreError},
};

/// Insert a new row and return its id.
pub async fn create(
    store: &dyn Store,
    policy: &ResourcePolicy,
    payload: &Payload,
) -> Result<RowId, ApiError> {
    let mutation = build_insert(policy, payload)?;
    let execution = run(store, &mutation).await?;

    execution.inserted_id.ok_or_else(|| {
        internal_failure(
            Some(mutation.operation()),
            &StoreError::uncoded("store did not report an inserted id"),
        )
    })
}

/// Update the row `id` with the updatable fields present in `payload`.
///
/// Updating a row that does not exist is not an error.
pub async fn update(
    store: &dyn Store,
    policy: &ResourcePolicy,
    id: RowId,
    payload: &Payload,
) -> Result<Execution, ApiError> {
    let mutation = build_update(policy, id, payload)?;
    let execution = run(store, &mutation).await?;
    if execution.rows_affected == 0 {
        debug!(table = policy.table(), id, "Update matched no rows");
    }
    Ok(execution)
}

/// Delete the row `id`. Deleting a row that does not exist is not an error.
pub async fn delete(
    store: &dyn Store,
    policy: &ResourcePolicy,
    id: RowId,
) -> Result<Execution, ApiError> {
    let mutation = build_delete(policy, id);
    let execution = run(store, &mutation).await?;
    if execution.rows_affected == 0 {
        debug!(table = policy.table(), id, "Delete matched no rows");
    }
    Ok(execution)
}

async fn run(store: &dyn Store, mutation: &Mutation) -> Result<Execution, ApiError> {
    store
        .execute(mutation)
        .await
        .map_err(|err| classify(mutation.operation(), &err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::shared::policy::{LOANS, USERS},
        store::{Lookup, MemoryStore},
        models::Resource,
    };
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => Payload::new(map),
            _ => panic!("object expected"),
        }
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let store = MemoryStore::new();
        let id = create(&store, &USERS, &payload(json!({"first_name": "Ada", "last_name": "L"})))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let execution = update(&store, &USERS, id, &payload(json!({"phone": 5551234})))
            .await
            .unwrap();
        assert_eq!(execution.rows_affected, 1);

        let rows = store.fetch(Lookup::by_id(Resource::User, id)).await.unwrap();
        assert_eq!(rows[0]["phone"], "5551234");
    }

    #[tokio::test]
    async fn test_missing_owner_is_classified() {
        let store = MemoryStore::new();
        let err = create(
            &store,
            &LOANS,
            &payload(json!({"user_id": 99, "amount": 10, "pay_time": 1})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::ReferenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_row_succeeds() {
        let store = MemoryStore::new();
        let execution = delete(&store, &LOANS, 404).await.unwrap();
        assert_eq!(execution.rows_affected, 0);
    }
}
