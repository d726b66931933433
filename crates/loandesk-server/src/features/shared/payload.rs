//! Request payload decoding
//!
//! A payload is a flat mapping from field name to value. Form-encoded bodies
//! are taken as already parsed; anything else must be a JSON document that
//! decodes to an object (or an array, which is keyed by index).

use axum::{
    extract::{rejection::PathRejection, Path},
    http::{header, HeaderMap},
};
use serde_json::{Map, Value};

use super::coerce::int_from_str;
use crate::{error::ApiError, models::RowId};

/// Decoded request fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Value of a field, treating an explicit `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Decode a request body into a [`Payload`].
///
/// `parsed` is the framework's pre-parsed body, if any. A non-empty pre-parsed
/// body wins; otherwise `raw` must hold a JSON object or array.
pub fn decode(parsed: Option<Payload>, raw: &[u8]) -> Result<Payload, ApiError> {
    if let Some(payload) = parsed.filter(|p| !p.is_empty()) {
        return Ok(payload);
    }

    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Payload::new(map)),
        Ok(Value::Array(items)) => Ok(Payload::new(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        )),
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Payload is not a mapping");
            Err(ApiError::MalformedPayload)
        },
        Err(e) => {
            tracing::debug!(error = %e, "Payload is not valid JSON");
            Err(ApiError::MalformedPayload)
        },
    }
}

/// Decode a request from its headers and raw body.
///
/// `application/x-www-form-urlencoded` bodies are parsed into string fields
/// first; every other content type goes straight to JSON decoding.
pub fn decode_request(headers: &HeaderMap, raw: &[u8]) -> Result<Payload, ApiError> {
    let parsed = is_form(headers).then(|| parse_form(raw));
    decode(parsed, raw)
}

/// Row id from the `:id` path segment, coerced loosely (`"abc"` is 0).
///
/// Records the id on the current span's `id` field.
pub fn path_id(path: Result<Path<String>, PathRejection>) -> Result<RowId, ApiError> {
    let Path(raw) = path?;
    let id = int_from_str(&raw);
    tracing::Span::current().record("id", id);
    Ok(id)
}

/// Parse a form-encoded body. Later duplicates of a key win.
pub fn parse_form(raw: &[u8]) -> Payload {
    let fields = url::form_urlencoded::parse(raw)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Payload::new(fields)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
