//! Success envelopes for each operation

use crate::{
    api::response::Envelope,
    models::{Resource, RowId},
    store::Row,
};

pub const READ_SUCCESS_MESSAGE: &str = "data got successfully";
pub const READ_EMPTY_MESSAGE: &str = "can't get data by specified data";

const OK: u16 = 200;

pub fn created(resource: Resource, row_id: RowId) -> Envelope {
    Envelope::success(format!("{} was successfully created!", resource.label()))
        .with_code(OK)
        .with_row_id(row_id)
}

pub fn updated(resource: Resource) -> Envelope {
    Envelope::success(format!("{} was successfully updated!", resource.label())).with_code(OK)
}

/// Loan deletions carry no `code`, unlike every other mutation.
pub fn deleted(resource: Resource, id: RowId) -> Envelope {
    let envelope = Envelope::success(format!(
        "{} with ID {} was successfully deleted!",
        resource.label(),
        id
    ));
    match resource {
        Resource::User => envelope.with_code(OK),
        Resource::Loan => envelope,
    }
}

/// Read result. No rows is reported as `status: false` without `details`.
pub fn rows(rows: Vec<Row>) -> Envelope {
    if rows.is_empty() {
        Envelope::failure(READ_EMPTY_MESSAGE)
    } else {
        Envelope::success(READ_SUCCESS_MESSAGE).with_details(rows)
    }
}
