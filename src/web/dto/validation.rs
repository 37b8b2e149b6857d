//! Validating extractors and custom validators for request DTOs.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;
use crate::ErrorMessage;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON and failed validation both answer
/// `400 ERR_INVALID_REQUEST_FIELD`; validation failures also list the
/// offending fields under `details`.
///
/// # Example
///
/// ```ignore
/// use storelens::web::dto::ValidatedJson;
///
/// async fn sign_up(
///     ValidatedJson(payload): ValidatedJson<SignUpRequest>,
/// ) -> Result<StatusCode, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "rejected request body");
            ApiError::bad_request(ErrorMessage::ErrInvalidRequestField)
        })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// A path extractor whose rejection is `400 ERR_INVALID_QUERY_PARAMETER`.
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected path parameter");
                ApiError::bad_request(ErrorMessage::ErrInvalidQueryParameter)
            })?;
        Ok(ValidatedPath(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Text that shows something: not blank and free of control characters.
pub fn visible_text(value: &str) -> Result<(), validator::ValidationError> {
    not_empty_trimmed(value)?;
    no_control_chars(value)
}

/// Display names are a single line without surrounding whitespace.
pub fn single_line_name(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim() != value || value.chars().any(char::is_control) {
        return Err(validator::ValidationError::new("single_line_name")
            .with_message("Must be a single line without leading or trailing spaces".into()));
    }
    Ok(())
}
