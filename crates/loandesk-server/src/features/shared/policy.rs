//! Field policy tables
//!
//! Static per-resource lists of which payload fields are required or optional
//! on create, which may be changed on update, and how each value is coerced
//! before binding. These tables are the only source of column names that ever
//! reach a statement.

use crate::models::Resource;

/// How a payload value is coerced before it is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Loose integer conversion (see [`super::coerce::to_int`])
    Integer,
    /// Textual conversion
    Text,
    /// Textual conversion, validated by the store as a `YYYY-MM-DD` date
    Date,
}

/// A single permitted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the request payload
    pub name: &'static str,
    /// Column the value is written to
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: name,
            kind,
        }
    }
}

/// Required and optional fields for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub required: &'static [FieldSpec],
    pub optional: &'static [FieldSpec],
}

impl FieldPolicy {
    /// Required fields followed by optional ones, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        let (required, optional) = (self.required, self.optional);
        required.iter().chain(optional.iter())
    }
}

/// Everything the pipeline needs to know about a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePolicy {
    pub resource: Resource,
    pub create: FieldPolicy,
    /// Fields a client may change; all optional, at least one must be sent
    pub update: FieldPolicy,
}

impl ResourcePolicy {
    pub fn table(&self) -> &'static str {
        self.resource.table()
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("first_name", FieldKind::Text),
    FieldSpec::new("last_name", FieldKind::Text),
    FieldSpec::new("phone", FieldKind::Text),
    FieldSpec::new("birth_date", FieldKind::Date),
];

const LOAN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user_id", FieldKind::Integer),
    FieldSpec::new("amount", FieldKind::Integer),
    FieldSpec::new("create_time", FieldKind::Integer),
    FieldSpec::new("pay_time", FieldKind::Integer),
];

pub const USERS: ResourcePolicy = ResourcePolicy {
    resource: Resource::User,
    create: FieldPolicy {
        required: &[
            FieldSpec::new("first_name", FieldKind::Text),
            FieldSpec::new("last_name", FieldKind::Text),
        ],
        optional: &[
            FieldSpec::new("phone", FieldKind::Text),
            FieldSpec::new("birth_date", FieldKind::Date),
        ],
    },
    update: FieldPolicy {
        required: &[],
        optional: USER_FIELDS,
    },
};

/// `create_time` is optional on create; the store defaults it to now.
pub const LOANS: ResourcePolicy = ResourcePolicy {
    resource: Resource::Loan,
    create: FieldPolicy {
        required: &[
            FieldSpec::new("user_id", FieldKind::Integer),
            FieldSpec::new("amount", FieldKind::Integer),
            FieldSpec::new("pay_time", FieldKind::Integer),
        ],
        optional: &[FieldSpec::new("create_time", FieldKind::Integer)],
    },
    update: FieldPolicy {
        required: &[],
        optional: LOAN_FIELDS,
    },
};

pub fn policy_for(resource: Resource) -> &'static ResourcePolicy {
    match resource {
        Resource::User => &USERS,
        Resource::Loan => &LOANS,
    }
}
