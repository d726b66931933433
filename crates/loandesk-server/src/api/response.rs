//! API response envelope
//!
//! Every response body, success or failure, is an [`Envelope`]:
//!
//! ```json
//! {"status": true, "message": "User was successfully created!", "code": 200, "row_id": 1}
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{models::RowId, store::Row};

/// Uniform JSON response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<RowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Row>>,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(true, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(false, message)
    }

    fn new(status: bool, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            row_id: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_row_id(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }

    pub fn with_details(mut self, rows: Vec<Row>) -> Self {
        self.details = Some(rows);
        self
    }
}

/// Envelopes built by handlers always go out as `200 OK`; failures carry
/// their status through [`ApiError`](crate::error::ApiError).
impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
