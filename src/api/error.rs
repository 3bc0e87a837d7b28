//! JSON error responses

use crate::error::{error_kind, ErrorKind, MatchError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Wire shape of every error response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An error on its way to the client
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    details: Option<String>,
}

impl ApiError {
    /// Classify a propagated error. Internal errors hide their cause behind a
    /// generic message; the cause chain is attached as `details` only when
    /// `expose_details` is set.
    pub fn from_error(error: anyhow::Error, expose_details: bool) -> Self {
        let kind = error_kind(&error);

        if kind == ErrorKind::InternalError {
            error!("Request failed: {:#}", error);
            return Self {
                kind,
                message: "Internal server error".to_string(),
                details: expose_details.then(|| format!("{:#}", error)),
            };
        }

        // Context layers are for logs; clients see the classified message
        let message = error
            .downcast_ref::<MatchError>()
            .map(MatchError::to_string)
            .unwrap_or_else(|| error.to_string());

        Self {
            kind,
            message,
            details: None,
        }
    }

    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message.clone(),
            error: self.kind,
            details: self.details.clone(),
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(error: MatchError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}
