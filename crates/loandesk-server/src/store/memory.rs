//! In-process store with the same constraint behavior as the PostgreSQL schema
//!
//! Failures carry PostgreSQL SQLSTATE codes so the error classifier treats
//! both stores alike.
//!
//! Dates accept the common `::date` input forms under the default `ISO, MDY`
//! date style: `1999-01-08`, `19990108`, `1999/01/08`, `1/8/1999`,
//! `Jan 8 1999` and `January 8, 1999`. Rarer PostgreSQL forms (`today`,
//! `epoch`, day-of-year, BC years, two-digit years) are rejected here while
//! the database takes them.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{into_rows, BoundValue, Execution, Lookup, Mutation, Row, Store, StoreError};
use crate::models::{Loan, LoanDetails, Resource, RowId, User};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const INVALID_DATETIME_FORMAT: &str = "22007";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y%m%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const NAME_MAX_CHARS: usize = 50;
const PHONE_MAX_CHARS: usize = 13;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<RowId, User>,
    loans: BTreeMap<RowId, Loan>,
    last_user_id: RowId,
    last_loan_id: RowId,
}

/// [`Store`] keeping both tables in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn execute(&self, mutation: &Mutation) -> Result<Execution, StoreError> {
        let mut tables = self.tables.lock().await;

        match mutation {
            Mutation::Insert {
                table,
                columns,
                values,
            } => {
                let assigned: Vec<(&str, &BoundValue)> =
                    columns.iter().copied().zip(values.iter()).collect();
                let id = match *table {
                    "users" => tables.insert_user(&assigned)?,
                    "loans" => tables.insert_loan(&assigned)?,
                    other => return Err(undefined_table(other)),
                };
                Ok(Execution {
                    rows_affected: 1,
                    inserted_id: Some(id),
                })
            },
            Mutation::Update {
                table,
                assignments,
                id,
            } => {
                let assigned: Vec<(&str, &BoundValue)> =
                    assignments.iter().map(|a| (a.column, &a.value)).collect();
                let rows_affected = match *table {
                    "users" => tables.update_user(*id, &assigned)?,
                    "loans" => tables.update_loan(*id, &assigned)?,
                    other => return Err(undefined_table(other)),
                };
                Ok(Execution {
                    rows_affected,
                    inserted_id: None,
                })
            },
            Mutation::Delete { table, id } => {
                let rows_affected = match *table {
                    "users" => tables.delete_user(*id)?,
                    "loans" => u64::from(tables.loans.remove(id).is_some()),
                    other => return Err(undefined_table(other)),
                };
                Ok(Execution {
                    rows_affected,
                    inserted_id: None,
                })
            },
        }
    }

    async fn fetch(&self, lookup: Lookup) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock().await;

        match lookup.resource {
            Resource::User => {
                let users: Vec<User> = tables
                    .users
                    .values()
                    .filter(|u| lookup.id.map_or(true, |id| u.id == id))
                    .cloned()
                    .collect();
                into_rows(users)
            },
            Resource::Loan => {
                let mut loans: Vec<LoanDetails> = tables
                    .loans
                    .values()
                    .filter(|l| lookup.id.map_or(true, |id| l.id == id))
                    .map(|l| LoanDetails::new(l, tables.users.get(&l.user_id)))
                    .collect();
                loans.sort_by_key(|l| (l.create_time, l.amount));
                into_rows(loans)
            },
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl Tables {
    fn insert_user(&mut self, assigned: &[(&str, &BoundValue)]) -> Result<RowId, StoreError> {
        let mut user = User {
            id: self.last_user_id + 1,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            birth_date: None,
        };
        let provided = apply(assigned, |column, value| set_user_column(&mut user, column, value))?;
        require(&provided, "users", &["first_name", "last_name"])?;

        self.last_user_id = user.id;
        self.users.insert(user.id, user);
        Ok(self.last_user_id)
    }

    fn insert_loan(&mut self, assigned: &[(&str, &BoundValue)]) -> Result<RowId, StoreError> {
        let mut loan = Loan {
            id: self.last_loan_id + 1,
            user_id: 0,
            amount: 0,
            create_time: chrono::Utc::now().timestamp(),
            pay_time: 0,
        };
        let provided = apply(assigned, |column, value| set_loan_column(&mut loan, column, value))?;
        require(&provided, "loans", &["user_id", "amount", "pay_time"])?;
        self.check_owner(loan.user_id)?;

        self.last_loan_id = loan.id;
        self.loans.insert(loan.id, loan);
        Ok(self.last_loan_id)
    }

    fn update_user(&mut self, id: RowId, assigned: &[(&str, &BoundValue)]) -> Result<u64, StoreError> {
        let Some(current) = self.users.get(&id) else {
            return Ok(0);
        };
        let mut user = current.clone();
        apply(assigned, |column, value| set_user_column(&mut user, column, value))?;
        self.users.insert(id, user);
        Ok(1)
    }

    fn update_loan(&mut self, id: RowId, assigned: &[(&str, &BoundValue)]) -> Result<u64, StoreError> {
        let Some(current) = self.loans.get(&id) else {
            return Ok(0);
        };
        let mut loan = current.clone();
        apply(assigned, |column, value| set_loan_column(&mut loan, column, value))?;
        self.check_owner(loan.user_id)?;
        self.loans.insert(id, loan);
        Ok(1)
    }

    fn delete_user(&mut self, id: RowId) -> Result<u64, StoreError> {
        if self.loans.values().any(|l| l.user_id == id) {
            return Err(StoreError::new(
                FOREIGN_KEY_VIOLATION,
                "update or delete on table \"users\" violates foreign key constraint \
                 \"loans_user_id_fkey\" on table \"loans\"",
            ));
        }
        Ok(u64::from(self.users.remove(&id).is_some()))
    }

    fn check_owner(&self, user_id: RowId) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::new(
                FOREIGN_KEY_VIOLATION,
                format!(
                    "insert or update on table \"loans\" violates foreign key constraint \
                     \"loans_user_id_fkey\": Key (user_id)=({}) is not present in table \"users\"",
                    user_id
                ),
            ))
        }
    }
}

/// Apply every assignment through `set`, returning the set of columns written.
fn apply<'a, F>(assigned: &[(&'a str, &BoundValue)], mut set: F) -> Result<HashSet<&'a str>, StoreError>
where
    F: FnMut(&str, &BoundValue) -> Result<(), StoreError>,
{
    let mut provided = HashSet::new();
    for (column, value) in assigned {
        set(*column, *value)?;
        provided.insert(*column);
    }
    Ok(provided)
}

fn require(provided: &HashSet<&str>, table: &str, not_null: &[&str]) -> Result<(), StoreError> {
    match not_null.iter().find(|column| !provided.contains(*column)) {
        Some(column) => Err(StoreError::new(
            NOT_NULL_VIOLATION,
            format!("null value in column \"{}\" of relation \"{}\"", column, table),
        )),
        None => Ok(()),
    }
}

fn set_user_column(user: &mut User, column: &str, value: &BoundValue) -> Result<(), StoreError> {
    match column {
        "first_name" => user.first_name = varchar(value, NAME_MAX_CHARS)?,
        "last_name" => user.last_name = varchar(value, NAME_MAX_CHARS)?,
        "phone" => user.phone = Some(varchar(value, PHONE_MAX_CHARS)?),
        "birth_date" => user.birth_date = Some(date(value)?),
        other => return Err(undefined_column(other, "users")),
    }
    Ok(())
}

fn set_loan_column(loan: &mut Loan, column: &str, value: &BoundValue) -> Result<(), StoreError> {
    match column {
        "user_id" => loan.user_id = bigint(value)?,
        "amount" => loan.amount = bigint(value)?,
        "create_time" => loan.create_time = bigint(value)?,
        "pay_time" => loan.pay_time = bigint(value)?,
        other => return Err(undefined_column(other, "loans")),
    }
    Ok(())
}

fn varchar(value: &BoundValue, max_chars: usize) -> Result<String, StoreError> {
    let text = match value {
        BoundValue::Int(v) => v.to_string(),
        BoundValue::Text(s) | BoundValue::Date(s) => s.clone(),
    };
    if text.chars().count() > max_chars {
        return Err(StoreError::new(
            STRING_DATA_RIGHT_TRUNCATION,
            format!("value too long for type character varying({})", max_chars),
        ));
    }
    Ok(text)
}

fn date(value: &BoundValue) -> Result<NaiveDate, StoreError> {
    let text = match value {
        BoundValue::Int(v) => v.to_string(),
        BoundValue::Text(s) | BoundValue::Date(s) => s.clone(),
    };
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            StoreError::new(
                INVALID_DATETIME_FORMAT,
                format!("invalid input syntax for type date: \"{}\"", text),
            )
        })
}

fn bigint(value: &BoundValue) -> Result<i64, StoreError> {
    match value {
        BoundValue::Int(v) => Ok(*v),
        BoundValue::Text(s) | BoundValue::Date(s) => s.parse().map_err(|_| {
            StoreError::new(
                INVALID_TEXT_REPRESENTATION,
                format!("invalid input syntax for type bigint: \"{}\"", s),
            )
        }),
    }
}

fn undefined_table(table: &str) -> StoreError {
    StoreError::new(UNDEFINED_TABLE, format!("relation \"{}\" does not exist", table))
}

fn undefined_column(column: &str, table: &str) -> StoreError {
    StoreError::new(
        UNDEFINED_COLUMN,
        format!("column \"{}\" of relation \"{}\" does not exist", column, table),
    )
}
