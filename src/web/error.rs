//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::proxy::{ProxyFailure, Relayed};
use crate::{ErrorMessage, StoreLensError};

/// Error response body.
///
/// `status` is the HTTP status rendered as a string, e.g. `"400"`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status: String,
    pub error_message: ErrorMessage,
    /// Field-level validation messages (only present for invalid bodies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorMessage,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: ErrorMessage) -> Self {
        Self {
            status,
            code,
            details: None,
        }
    }

    pub fn bad_request(code: ErrorMessage) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code)
    }

    pub fn unauthorized(code: ErrorMessage) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code)
    }

    pub fn not_found(code: ErrorMessage) -> Self {
        Self::new(StatusCode::NOT_FOUND, code)
    }

    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, ErrorMessage::ErrTooManyRequests)
    }

    pub fn internal(code: ErrorMessage) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> ErrorMessage {
        self.code
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self {
            status: StatusCode::BAD_REQUEST,
            code: ErrorMessage::ErrInvalidRequestField,
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: self.status.as_u16().to_string(),
            error_message: self.code,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.code)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreLensError> for ApiError {
    fn from(err: StoreLensError) -> Self {
        match err {
            StoreLensError::BadRequest(code) => ApiError::bad_request(code),
            StoreLensError::Unauthorized(code) => ApiError::unauthorized(code),
            StoreLensError::NotFound(code) => ApiError::not_found(code),
            StoreLensError::Internal(code) => {
                tracing::error!(code = %code, "request failed");
                ApiError::internal(code)
            }
            other => {
                tracing::error!("Internal error: {}", other);
                ApiError::internal(other.code())
            }
        }
    }
}

/// Body of a failed proxy call.
#[derive(Debug, Serialize)]
pub struct ProxyErrorBody {
    pub error: &'static str,
    pub message: ErrorMessage,
}

/// Error type of the proxy handlers.
///
/// Request problems (bad body, missing login, undecryptable id) use the
/// regular [`ApiError`] body; failed upstream calls use [`ProxyErrorBody`].
#[derive(Debug)]
pub enum ProxyError {
    Api(ApiError),
    Upstream(ProxyFailure),
}

impl From<ApiError> for ProxyError {
    fn from(err: ApiError) -> Self {
        ProxyError::Api(err)
    }
}

impl From<ProxyFailure> for ProxyError {
    fn from(failure: ProxyFailure) -> Self {
        ProxyError::Upstream(failure)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Api(err) => err.into_response(),
            ProxyError::Upstream(failure) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyErrorBody {
                    error: failure.context,
                    message: failure.code,
                }),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
