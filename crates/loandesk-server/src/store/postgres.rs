//! PostgreSQL store backed by a `sqlx` pool

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row as _};
use tracing::debug;

use super::{into_rows, BoundValue, Execution, Lookup, Mutation, Row, Store, StoreError};
use crate::models::{LoanDetails, Resource, User};

const USERS_ALL: &str = "SELECT id, first_name, last_name, phone, birth_date \
                         FROM users ORDER BY id";
const USERS_BY_ID: &str = "SELECT id, first_name, last_name, phone, birth_date \
                           FROM users WHERE id = $1";

const LOANS_ALL: &str = "SELECT l.id, l.user_id, l.amount, l.create_time, l.pay_time, \
                         u.first_name, u.last_name, u.phone, u.birth_date \
                         FROM loans AS l LEFT JOIN users AS u ON l.user_id = u.id \
                         ORDER BY l.create_time, l.amount";
const LOANS_BY_ID: &str = "SELECT l.id, l.user_id, l.amount, l.create_time, l.pay_time, \
                           u.first_name, u.last_name, u.phone, u.birth_date \
                           FROM loans AS l LEFT JOIN users AS u ON l.user_id = u.id \
                           WHERE l.id = $1 \
                           ORDER BY l.create_time, l.amount";

/// SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BoundValue>,
}

/// Render a mutation as a single parameterized statement.
///
/// Table and column names come from the static field policies, never from
/// request input. Every value is a `$n` parameter; date values are cast with
/// `::date` so PostgreSQL validates them.
pub fn render(mutation: &Mutation) -> Statement {
    match mutation {
        Mutation::Insert {
            table,
            columns,
            values,
        } => {
            let placeholders: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, value)| placeholder(i + 1, value))
                .collect();
            Statement {
                sql: format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
                    table,
                    columns.join(", "),
                    placeholders.join(", ")
                ),
                params: values.clone(),
            }
        },
        Mutation::Update {
            table,
            assignments,
            id,
        } => {
            let sets: Vec<String> = assignments
                .iter()
                .enumerate()
                .map(|(i, a)| format!("{} = {}", a.column, placeholder(i + 1, &a.value)))
                .collect();
            let mut params: Vec<BoundValue> =
                assignments.iter().map(|a| a.value.clone()).collect();
            params.push(BoundValue::Int(*id));
            Statement {
                sql: format!(
                    "UPDATE {} SET {} WHERE id = ${}",
                    table,
                    sets.join(", "),
                    params.len()
                ),
                params,
            }
        },
        Mutation::Delete { table, id } => Statement {
            sql: format!("DELETE FROM {} WHERE id = $1", table),
            params: vec![BoundValue::Int(*id)],
        },
    }
}

fn placeholder(index: usize, value: &BoundValue) -> String {
    match value {
        BoundValue::Date(_) => format!("${}::date", index),
        _ => format!("${}", index),
    }
}

/// [`Store`] over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn execute(&self, mutation: &Mutation) -> Result<Execution, StoreError> {
        let statement = render(mutation);
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing mutation");

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = match param {
                BoundValue::Int(v) => query.bind(*v),
                BoundValue::Text(s) | BoundValue::Date(s) => query.bind(s.clone()),
            };
        }

        match mutation {
            Mutation::Insert { .. } => {
                let row = query.fetch_one(&self.pool).await?;
                let id: i64 = row.try_get("id")?;
                Ok(Execution {
                    rows_affected: 1,
                    inserted_id: Some(id),
                })
            },
            Mutation::Update { .. } | Mutation::Delete { .. } => {
                let result = query.execute(&self.pool).await?;
                Ok(Execution {
                    rows_affected: result.rows_affected(),
                    inserted_id: None,
                })
            },
        }
    }

    async fn fetch(&self, lookup: Lookup) -> Result<Vec<Row>, StoreError> {
        match lookup.resource {
            Resource::User => {
                let sql = if lookup.id.is_some() { USERS_BY_ID } else { USERS_ALL };
                let mut query = sqlx::query_as::<_, User>(sql);
                if let Some(id) = lookup.id {
                    query = query.bind(id);
                }
                into_rows(query.fetch_all(&self.pool).await?)
            },
            Resource::Loan => {
                let sql = if lookup.id.is_some() { LOANS_BY_ID } else { LOANS_ALL };
                let mut query = sqlx::query_as::<_, LoanDetails>(sql);
                if let Some(id) = lookup.id {
                    query = query.bind(id);
                }
                into_rows(query.fetch_all(&self.pool).await?)
            },
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
