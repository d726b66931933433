//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key type shared by both tables.
pub type RowId = i64;

/// The two managed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    User,
    Loan,
}

impl Resource {
    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            Resource::User => "users",
            Resource::Loan => "loans",
        }
    }

    /// Capitalized name used in response messages
    pub fn label(self) -> &'static str {
        match self {
            Resource::User => "User",
            Resource::Loan => "Loan",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Borrower row (`users` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: RowId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Loan row (`loans` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: RowId,
    pub user_id: RowId,
    pub amount: i64,
    pub create_time: i64,
    pub pay_time: i64,
}

/// Loan row joined with its borrower's columns, as returned by loan reads.
///
/// The borrower columns are optional because the join is a LEFT JOIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LoanDetails {
    pub id: RowId,
    pub user_id: RowId,
    pub amount: i64,
    pub create_time: i64,
    pub pay_time: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl LoanDetails {
    pub fn new(loan: &Loan, owner: Option<&User>) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            amount: loan.amount,
            create_time: loan.create_time,
            pay_time: loan.pay_time,
            first_name: owner.map(|u| u.first_name.clone()),
            last_name: owner.map(|u| u.last_name.clone()),
            phone: owner.and_then(|u| u.phone.clone()),
            birth_date: owner.and_then(|u| u.birth_date),
        }
    }
}
