//! Account handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::user::UserService;
use crate::web::dto::{
    LoginRequest, LoginResponse, NameRequest, SignUpRequest, UpdatePasswordRequest,
    UserInfoResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// POST /api/user/name/check - Check whether a display name is free.
pub async fn check_name(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<NameRequest>,
) -> Result<StatusCode, ApiError> {
    UserService::new(&state.db).check_name(&req.name).await?;
    Ok(StatusCode::OK)
}

/// POST /api/user - Sign up with mail, name and password.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> Result<StatusCode, ApiError> {
    UserService::new(&state.db)
        .sign_up(&req.mail, &req.name, &req.password)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/user/login - Log in and receive an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = UserService::new(&state.db)
        .login(&req.mail, &req.password, &state.tokens, &state.ids)
        .await?;
    Ok(Json(outcome.into()))
}

/// PUT /api/user/name - Change the caller's display name.
pub async fn update_name(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<NameRequest>,
) -> Result<StatusCode, ApiError> {
    UserService::new(&state.db)
        .update_name(principal.user_id, &req.name)
        .await?;
    Ok(StatusCode::OK)
}

/// PUT /api/user/password - Reset a password with an emailed code.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    UserService::new(&state.db)
        .update_password(&req.mail, req.user_number, &req.password, state.codes())
        .await?;
    Ok(StatusCode::OK)
}

/// GET /api/user - The caller's account details.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let info = UserService::new(&state.db).get_info(principal.user_id).await?;
    Ok(Json(info.into()))
}

/// DELETE /api/user - Delete the caller's account.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<StatusCode, ApiError> {
    UserService::new(&state.db).delete(principal.user_id).await?;
    Ok(StatusCode::OK)
}
