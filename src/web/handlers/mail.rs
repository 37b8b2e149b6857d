//! Mail verification handlers.

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::web::dto::{MailRequest, MailVerifyRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::state::AppState;

/// POST /api/mail - Send a verification code. Delivery happens in the background.
pub async fn send_code(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<MailRequest>,
) -> Result<StatusCode, ApiError> {
    state.mail.send_code(&req.mail)?;
    Ok(StatusCode::OK)
}

/// POST /api/mail/verify - Check a verification code without consuming it.
pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<MailVerifyRequest>,
) -> Result<StatusCode, ApiError> {
    state.mail.verify_code(&req.mail, req.user_number)?;
    Ok(StatusCode::OK)
}
