//! Mutation builder
//!
//! Turns a decoded payload plus a resource policy into a parameterized
//! [`Mutation`]. Fields outside the policy are ignored. Values are coerced
//! according to their [`FieldKind`](super::policy::FieldKind) and never
//! interpolated into SQL text.

use super::{payload::Payload, policy::ResourcePolicy};
use crate::{
    error::ApiError,
    models::RowId,
    store::{Assignment, Mutation},
};

/// Build the insert for a create request.
///
/// Required fields are checked in policy order; the first missing one is
/// reported.
pub fn build_insert(policy: &ResourcePolicy, payload: &Payload) -> Result<Mutation, ApiError> {
    let mut columns = Vec::with_capacity(policy.create.required.len());
    let mut values = Vec::with_capacity(policy.create.required.len());

    for field in policy.create.required {
        let value = payload
            .get(field.name)
            .ok_or(ApiError::MissingRequiredField(field.name))?;
        columns.push(field.column);
        values.push(field.kind.coerce(value));
    }

    for field in policy.create.optional {
        if let Some(value) = payload.get(field.name) {
            columns.push(field.column);
            values.push(field.kind.coerce(value));
        }
    }

    Ok(Mutation::Insert {
        table: policy.table(),
        columns,
        values,
    })
}

/// Build the update for `id`, assigning every updatable field present in the
/// payload.
pub fn build_update(
    policy: &ResourcePolicy,
    id: RowId,
    payload: &Payload,
) -> Result<Mutation, ApiError> {
    let assignments: Vec<Assignment> = policy
        .update
        .fields()
        .filter_map(|field| {
            payload.get(field.name).map(|value| Assignment {
                column: field.column,
                value: field.kind.coerce(value),
            })
        })
        .collect();

    if assignments.is_empty() {
        return Err(ApiError::NoValidParameters);
    }

    Ok(Mutation::Update {
        table: policy.table(),
        assignments,
        id,
    })
}

pub fn build_delete(policy: &ResourcePolicy, id: RowId) -> Mutation {
    Mutation::Delete {
        table: policy.table(),
        id,
    }
}
