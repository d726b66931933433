//! Request-to-mutation pipeline shared by the resource features
//!
//! # Contents
//!
//! - **policy**: Per-resource field policy tables
//! - **payload**: Request body decoding
//! - **coerce**: Loose integer and text coercion
//! - **mutation**: Parameterized insert, update and delete builders
//! - **classify**: Store error classification
//! - **commands** / **queries**: The write and read pipelines handlers call
//! - **response**: Success envelopes for each operation

pub mod classify;
pub mod coerce;
pub mod commands;
pub mod mutation;
pub mod payload;
pub mod policy;
pub mod queries;
pub mod response;

pub use payload::{decode_request, path_id, Payload};
pub use policy::{policy_for, FieldKind, FieldPolicy, FieldSpec, ResourcePolicy, LOANS, USERS};
