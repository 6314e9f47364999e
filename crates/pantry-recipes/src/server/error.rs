//! HTTP error responses

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// What the caller sees when a question could not be answered
pub const GENERIC_FAILURE: &str = "Sorry, I was unable to answer that question. Please try again.";

/// An error response carrying the request id
///
/// Only client mistakes are described to the caller. Upstream and internal
/// failures are logged in full and reported with [`GENERIC_FAILURE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    request_id: String,
}

impl ApiError {
    /// Map a question failure to a response
    pub fn from_error(err: &pantry_core::Error, request_id: &str) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        };
        Self {
            status: status_for(err),
            kind: err.kind(),
            message,
            request_id: request_id.to_string(),
        }
    }

    /// A request that could not be read at all
    pub fn rejected(status: StatusCode, message: impl Into<String>, request_id: &str) -> Self {
        Self {
            status,
            kind: "invalid_request",
            message: message.into(),
            request_id: request_id.to_string(),
        }
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// HTTP status for each question failure
pub fn status_for(err: &pantry_core::Error) -> StatusCode {
    use pantry_core::Error;
    match err {
        Error::InvalidQuestion(_) => StatusCode::BAD_REQUEST,
        Error::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Upstream(_) | Error::UnknownTool(_) | Error::EmptyAnswer => StatusCode::BAD_GATEWAY,
        Error::LoopBoundExceeded { .. } | Error::InitializationFailed(_) | Error::Generic(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
            "request_id": self.request_id,
        }));
        (self.status, [(super::REQUEST_ID_HEADER, self.request_id)], body).into_response()
    }
}
