//! Domain error taxonomy and its HTTP mapping

use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::Envelope;

/// Result type alias for request handling
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Every way a request can fail, independent of the store engine.
///
/// The `Display` text is the `message` clients see.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Body was not valid JSON or did not decode to a mapping
    #[error("Invalid JSON format")]
    MalformedPayload,

    #[error("Param \"{0}\" is required!")]
    MissingRequiredField(&'static str),

    /// Update payload contained none of the updatable fields
    #[error("No valid parameters provided")]
    NoValidParameters,

    /// A referenced parent row does not exist
    #[error("{0}")]
    ReferenceNotFound(&'static str),

    /// The row is still referenced by child rows
    #[error("{0}")]
    ReferencedByOthers(&'static str),

    /// The store rejected a value's format or size
    #[error("{0}")]
    InvalidFormat(&'static str),

    #[error("Internal error was raised")]
    InternalFailure,

    /// Failure caught at the outermost boundary (unknown route, bad method,
    /// handler panic)
    #[error("{message}")]
    Unhandled { code: u16, message: String },
}

/// Marker attached to responses built from [`ApiError::Unhandled`] so the
/// request boundary can log them with the request path and remote address.
#[derive(Debug, Clone)]
pub struct UnhandledFailure {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn unhandled(code: u16, message: impl Into<String>) -> Self {
        Self::Unhandled {
            code,
            message: message.into(),
        }
    }

    /// HTTP status for this error
    ///
    /// Unhandled failures use their own code when it is a valid status in
    /// `[200, 600]`, otherwise 500.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload
            | ApiError::MissingRequiredField(_)
            | ApiError::NoValidParameters
            | ApiError::ReferenceNotFound(_)
            | ApiError::ReferencedByOthers(_)
            | ApiError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unhandled { code, .. } => unhandled_status(*code),
        }
    }
}

fn unhandled_status(code: u16) -> StatusCode {
    if (200..=600).contains(&code) {
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Framework rejections become envelopes carrying the rejection's status.
/// The framework's detail text is logged, the client only sees the reason
/// phrase.
fn rejected(status: StatusCode, detail: String) -> ApiError {
    tracing::warn!(status = status.as_u16(), %detail, "Request rejected before reaching handler");
    ApiError::unhandled(
        status.as_u16(),
        status.canonical_reason().unwrap_or("Bad Request"),
    )
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = Envelope::failure(self.to_string());

        match self {
            ApiError::Unhandled { code, message } => {
                let mut response = (status, Json(envelope.with_code(code))).into_response();
                response
                    .extensions_mut()
                    .insert(UnhandledFailure { code, message });
                response
            },
            _ => (status, Json(envelope)).into_response(),
        }
    }
}
