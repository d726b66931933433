//! Relational store seam
//!
//! Handlers never talk to a database directly. They hand a [`Mutation`] or a
//! [`Lookup`] to a [`Store`] and get back an [`Execution`], rows, or a
//! [`StoreError`] carrying the engine's own error code.
//!
//! Two implementations ship with the server:
//!
//! - [`PgStore`] - PostgreSQL through a `sqlx` pool
//! - [`MemoryStore`] - in-process tables with the same constraint behavior,
//!   used by the test suite and for running locally without a database

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::{Resource, RowId};

/// One result row as returned to clients.
pub type Row = Map<String, Value>;

/// Kind of write a mutation performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Insert => write!(f, "insert"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Int(i64),
    Text(String),
    /// Date in text form; the store parses and validates it.
    Date(String),
}

/// `column = ?` in an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: BoundValue,
}

/// A parameterized write against one table.
///
/// Update and delete always carry the primary key of the single row they
/// address; there is no way to express a multi-row write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Insert {
        table: &'static str,
        columns: Vec<&'static str>,
        values: Vec<BoundValue>,
    },
    Update {
        table: &'static str,
        assignments: Vec<Assignment>,
        id: RowId,
    },
    Delete {
        table: &'static str,
        id: RowId,
    },
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Insert { .. } => Operation::Insert,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Mutation::Insert { table, .. }
            | Mutation::Update { table, .. }
            | Mutation::Delete { table, .. } => table,
        }
    }
}

/// Read of all rows of a resource, or of a single row by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub resource: Resource,
    pub id: Option<RowId>,
}

impl Lookup {
    pub fn all(resource: Resource) -> Self {
        Self { resource, id: None }
    }

    pub fn by_id(resource: Resource, id: RowId) -> Self {
        Self {
            resource,
            id: Some(id),
        }
    }
}

/// Outcome of a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Execution {
    pub rows_affected: u64,
    /// Primary key assigned by the store, for inserts
    pub inserted_id: Option<RowId>,
}

/// Failure reported by a store.
///
/// `code` is the engine's own identifier (a PostgreSQL SQLSTATE such as
/// `23503`, or a MySQL error number such as `1452`). Connection-level
/// failures have no code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) => Self {
                code: db_err.code().map(|c| c.into_owned()),
                message: db_err.message().to_string(),
            },
            other => Self::uncoded(other.to_string()),
        }
    }
}

/// Executes parameterized statements against the relational store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run a single-statement mutation.
    async fn execute(&self, mutation: &Mutation) -> Result<Execution, StoreError>;

    /// Read rows for a resource.
    async fn fetch(&self, lookup: Lookup) -> Result<Vec<Row>, StoreError>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Serialize typed rows into client-facing row objects.
pub(crate) fn into_rows<T: serde::Serialize>(records: Vec<T>) -> Result<Vec<Row>, StoreError> {
    records
        .into_iter()
        .map(|record| match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::uncoded("row did not serialize to an object")),
            Err(e) => Err(StoreError::uncoded(e.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_operation_and_table() {
        let m = Mutation::Delete {
            table: "loans",
            id: 4,
        };
        assert_eq!(m.operation(), Operation::Delete);
        assert_eq!(m.table(), "loans");
    }

    #[test]
    fn test_store_error_code() {
        let err = StoreError::new("23503", "fk");
        assert_eq!(err.code(), Some("23503"));
        assert_eq!(StoreError::uncoded("down").code(), None);
        assert_eq!(err.to_string(), "fk");
    }

    #[test]
    fn test_sqlx_non_database_error_has_no_code() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(err.code.is_none());
    }

    #[test]
    fn test_into_rows() {
        let rows = into_rows(vec![serde_json::json!({"id": 1})]).unwrap();
        assert_eq!(rows[0]["id"], 1);
        assert!(into_rows(vec![1]).is_err());
    }
}
