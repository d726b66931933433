//! Store error classification
//!
//! Maps an engine error code plus the operation that raised it onto a domain
//! [`ApiError`]. Codes for both PostgreSQL (SQLSTATE) and MySQL (error
//! numbers) are recognized, so switching engines only means the store reports
//! its own codes.

use tracing::{error, warn};

use crate::{
    error::ApiError,
    store::{Operation, StoreError},
};

/// Domain failure a rule classifies into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ReferenceNotFound,
    ReferencedByOthers,
    InvalidFormat,
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub codes: &'static [&'static str],
    /// Operations the rule applies to
    pub operations: &'static [Operation],
    pub kind: FailureKind,
    pub message: &'static str,
}

impl ClassificationRule {
    fn matches(&self, operation: Operation, code: &str) -> bool {
        self.operations.contains(&operation) && self.codes.contains(&code)
    }

    fn to_error(self) -> ApiError {
        match self.kind {
            FailureKind::ReferenceNotFound => ApiError::ReferenceNotFound(self.message),
            FailureKind::ReferencedByOthers => ApiError::ReferencedByOthers(self.message),
            FailureKind::InvalidFormat => ApiError::InvalidFormat(self.message),
        }
    }
}

const WRITES: &[Operation] = &[Operation::Insert, Operation::Update];

pub const REFERENCE_NOT_FOUND_MESSAGE: &str = "Specified user_id does not exist!";
pub const REFERENCED_BY_OTHERS_MESSAGE: &str =
    "Impossible to delete a user because the user has loans";
pub const INVALID_DATE_MESSAGE: &str = "Incorrect date format!";
pub const VALUE_TOO_LONG_MESSAGE: &str = "Value is too long!";

/// Default rules. The first matching rule wins.
///
/// PostgreSQL reports the same foreign key SQLSTATE (`23503`) for a missing
/// parent and for a restricted delete, so the operation disambiguates.
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        codes: &["23503", "1452"],
        operations: WRITES,
        kind: FailureKind::ReferenceNotFound,
        message: REFERENCE_NOT_FOUND_MESSAGE,
    },
    ClassificationRule {
        codes: &["23503", "1451"],
        operations: &[Operation::Delete],
        kind: FailureKind::ReferencedByOthers,
        message: REFERENCED_BY_OTHERS_MESSAGE,
    },
    ClassificationRule {
        codes: &["22007", "22008", "1292"],
        operations: WRITES,
        kind: FailureKind::InvalidFormat,
        message: INVALID_DATE_MESSAGE,
    },
    ClassificationRule {
        codes: &["22001", "1406"],
        operations: WRITES,
        kind: FailureKind::InvalidFormat,
        message: VALUE_TOO_LONG_MESSAGE,
    },
];

/// Classify a failed mutation with the default [`RULES`].
pub fn classify(operation: Operation, err: &StoreError) -> ApiError {
    classify_with(RULES, operation, err)
}

/// Classify a failed mutation against an explicit rule table.
///
/// Unmatched failures become [`ApiError::InternalFailure`] and are logged at
/// error level with the engine's message; the message never reaches clients.
pub fn classify_with(
    rules: &[ClassificationRule],
    operation: Operation,
    err: &StoreError,
) -> ApiError {
    let rule = err
        .code()
        .and_then(|code| rules.iter().find(|rule| rule.matches(operation, code)));

    match rule {
        Some(rule) => {
            warn!(
                operation = %operation,
                code = err.code().unwrap_or_default(),
                kind = ?rule.kind,
                "Store rejected mutation"
            );
            rule.to_error()
        },
        None => internal_failure(Some(operation), err),
    }
}

/// Log an unclassified store failure and hide it behind
/// [`ApiError::InternalFailure`].
pub fn internal_failure(operation: Option<Operation>, err: &StoreError) -> ApiError {
    error!(
        operation = operation.map(|op| op.to_string()).as_deref().unwrap_or("read"),
        code = ?err.code(),
        error = %err,
        "Unclassified store failure"
    );
    ApiError::InternalFailure
}
