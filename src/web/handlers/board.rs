//! Board handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::board::{BoardService, PostDraft};
use crate::web::dto::{
    BoardResponse, InsertedIdResponse, PageCountResponse, PostRequest, ValidatedJson,
    ValidatedPath,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/board/page/:pageNum - One page of posts, newest first.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    ValidatedPath(page): ValidatedPath<i64>,
) -> Result<Json<Vec<BoardResponse>>, ApiError> {
    let posts = BoardService::new(&state.db).list_page(page).await?;
    Ok(Json(posts.into_iter().map(BoardResponse::from).collect()))
}

/// GET /api/board/page_count
pub async fn page_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PageCountResponse>, ApiError> {
    let page_count = BoardService::new(&state.db).page_count().await?;
    Ok(Json(PageCountResponse { page_count }))
}

/// GET /api/board/:boardId - Read a post. Counts as a view.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidatedPath(board_id): ValidatedPath<i64>,
) -> Result<Json<BoardResponse>, ApiError> {
    let post = BoardService::new(&state.db).get(board_id).await?;
    Ok(Json(post.into()))
}

/// POST /api/board
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<Json<InsertedIdResponse>, ApiError> {
    let draft = PostDraft::new(req.title, req.content);
    let inserted_id = BoardService::new(&state.db)
        .create(principal.user_id, &draft)
        .await?;
    Ok(Json(InsertedIdResponse { inserted_id }))
}

/// PUT /api/board/:boardId - Author only.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(board_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<StatusCode, ApiError> {
    let draft = PostDraft::new(req.title, req.content);
    BoardService::new(&state.db)
        .update(principal.user_id, board_id, &draft)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/board/:boardId - Author or admin.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(board_id): ValidatedPath<i64>,
) -> Result<StatusCode, ApiError> {
    BoardService::new(&state.db)
        .delete(principal.user_id, principal.role, board_id)
        .await?;
    Ok(StatusCode::OK)
}
