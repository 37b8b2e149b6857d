//! Comment handlers.
//!
//! The path id is a board id for GET and POST and a comment id for PATCH
//! and DELETE.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::board::CommentService;
use crate::web::dto::{
    CommentRequest, CommentResponse, InsertedIdResponse, ValidatedJson, ValidatedPath,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/comment/:boardId
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ValidatedPath(board_id): ValidatedPath<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = CommentService::new(&state.db).list(board_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// POST /api/comment/:boardId
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(board_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<Json<InsertedIdResponse>, ApiError> {
    let inserted_id = CommentService::new(&state.db)
        .create(principal.user_id, board_id, &req.content)
        .await?;
    Ok(Json(InsertedIdResponse { inserted_id }))
}

/// PATCH /api/comment/:commentId - Owner only.
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(comment_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<StatusCode, ApiError> {
    CommentService::new(&state.db)
        .update(principal.user_id, comment_id, &req.content)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/comment/:commentId - Owner or admin.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(comment_id): ValidatedPath<i64>,
) -> Result<StatusCode, ApiError> {
    CommentService::new(&state.db)
        .delete(principal.user_id, principal.role, comment_id)
        .await?;
    Ok(StatusCode::OK)
}
