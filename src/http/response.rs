//! Error responses sent to the client.
//!
//! # Responsibilities
//! - Serialize the `{"code": .., "message": ..}` error body
//! - Map translation and forwarding errors to HTTP status codes
//!
//! # Design Decisions
//! - The transport status always matches the `code` field of the body
//! - Backend failures are gateway errors (502/504), never a hang or empty body

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::imaginary::TranslateError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: u16,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorMessage {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(&self) {
            Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize error message");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl IntoResponse for TranslateError {
    fn into_response(self) -> Response {
        ErrorMessage::new(self.code(), self.to_string()).into_response()
    }
}

/// Server-side failure while proxying a valid request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("imaginary is unreachable: {0}")]
    BackendUnreachable(String),

    #[error("imaginary did not answer within {0} seconds")]
    BackendTimeout(u64),

    #[error("too many concurrent requests")]
    Overloaded,

    #[error("could not build backend request: {0}")]
    InvalidRequest(String),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::BackendUnreachable(_) => StatusCode::BAD_GATEWAY,
            ForwardError::BackendTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            ForwardError::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        ErrorMessage::new(self.status().as_u16(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_json() {
        let msg = ErrorMessage::new(404, "You must define method");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"code":404,"message":"You must define method"}"#
        );
    }

    #[test]
    fn test_translate_error_response() {
        let response = TranslateError::WidthMissing.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_forward_error_status() {
        assert_eq!(
            ForwardError::BackendUnreachable("refused".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ForwardError::BackendTimeout(10).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ForwardError::Overloaded.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
