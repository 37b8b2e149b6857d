//! Error types for StoreLens.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Enumerated error code carried by every client-facing error.
///
/// Serialized in SCREAMING_SNAKE_CASE, e.g. `ERR_NAME_DUPLICATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorMessage {
    // 400
    ErrInvalidRequestField,
    ErrInvalidQueryParameter,
    ErrNameDuplicate,
    ErrUserDuplicate,
    ErrLoginFailed,
    ErrInvalidMailNumber,

    // 401
    ErrUnauthorized,
    ErrNotAllowedUser,

    // 404
    ErrNotFoundUser,
    ErrBoardNotFound,
    ErrCommentNotFound,
    ErrNoticeNotFound,
    ErrNotResource,

    // 429
    ErrTooManyRequests,

    // 500
    ErrInternalServerError,
    ErrInternalServerEncryptionError,
    ErrInternalServerDecryptionError,
    ErrInternalServerMailSendFailError,
}

impl ErrorMessage {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMessage::ErrInvalidRequestField => "ERR_INVALID_REQUEST_FIELD",
            ErrorMessage::ErrInvalidQueryParameter => "ERR_INVALID_QUERY_PARAMETER",
            ErrorMessage::ErrNameDuplicate => "ERR_NAME_DUPLICATE",
            ErrorMessage::ErrUserDuplicate => "ERR_USER_DUPLICATE",
            ErrorMessage::ErrLoginFailed => "ERR_LOGIN_FAILED",
            ErrorMessage::ErrInvalidMailNumber => "ERR_INVALID_MAIL_NUMBER",
            ErrorMessage::ErrUnauthorized => "ERR_UNAUTHORIZED",
            ErrorMessage::ErrNotAllowedUser => "ERR_NOT_ALLOWED_USER",
            ErrorMessage::ErrNotFoundUser => "ERR_NOT_FOUND_USER",
            ErrorMessage::ErrBoardNotFound => "ERR_BOARD_NOT_FOUND",
            ErrorMessage::ErrCommentNotFound => "ERR_COMMENT_NOT_FOUND",
            ErrorMessage::ErrNoticeNotFound => "ERR_NOTICE_NOT_FOUND",
            ErrorMessage::ErrNotResource => "ERR_NOT_RESOURCE",
            ErrorMessage::ErrTooManyRequests => "ERR_TOO_MANY_REQUESTS",
            ErrorMessage::ErrInternalServerError => "ERR_INTERNAL_SERVER_ERROR",
            ErrorMessage::ErrInternalServerEncryptionError => {
                "ERR_INTERNAL_SERVER_ENCRYPTION_ERROR"
            }
            ErrorMessage::ErrInternalServerDecryptionError => {
                "ERR_INTERNAL_SERVER_DECRYPTION_ERROR"
            }
            ErrorMessage::ErrInternalServerMailSendFailError => {
                "ERR_INTERNAL_SERVER_MAIL_SEND_FAIL_ERROR"
            }
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common error type for StoreLens.
#[derive(Error, Debug)]
pub enum StoreLensError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request was well-formed but rejected by a business rule.
    #[error("bad request: {0}")]
    BadRequest(ErrorMessage),

    /// Missing credentials or an action the caller may not perform.
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorMessage),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(ErrorMessage),

    /// Internal failure with a client-visible code.
    #[error("internal error: {0}")]
    Internal(ErrorMessage),
}

impl StoreLensError {
    /// The error code a client should see for this error.
    pub fn code(&self) -> ErrorMessage {
        match self {
            StoreLensError::BadRequest(code)
            | StoreLensError::Unauthorized(code)
            | StoreLensError::NotFound(code)
            | StoreLensError::Internal(code) => *code,
            _ => ErrorMessage::ErrInternalServerError,
        }
    }
}

impl From<sqlx::Error> for StoreLensError {
    fn from(e: sqlx::Error) -> Self {
        StoreLensError::Database(e.to_string())
    }
}

/// Result type alias for StoreLens operations.
pub type Result<T> = std::result::Result<T, StoreLensError>;
