//! Notice handlers. Writes are admin only; reads are public.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::board::PostDraft;
use crate::notice::NoticeService;
use crate::web::dto::{
    InsertedIdResponse, NoticeResponse, PageCountResponse, PostRequest, ValidatedJson,
    ValidatedPath,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// POST /api/notice
pub async fn create_notice(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<Json<InsertedIdResponse>, ApiError> {
    let draft = PostDraft::new(req.title, req.content);
    let inserted_id = NoticeService::new(&state.db)
        .create(principal.user_id, &draft)
        .await?;
    Ok(Json(InsertedIdResponse { inserted_id }))
}

/// GET /api/notice/:noticeId - Counts as a view.
pub async fn get_notice(
    State(state): State<Arc<AppState>>,
    ValidatedPath(notice_id): ValidatedPath<i64>,
) -> Result<Json<NoticeResponse>, ApiError> {
    let notice = NoticeService::new(&state.db).get(notice_id).await?;
    Ok(Json(notice.into()))
}

/// GET /api/notice/page/:pageNum
pub async fn list_notices(
    State(state): State<Arc<AppState>>,
    ValidatedPath(page): ValidatedPath<i64>,
) -> Result<Json<Vec<NoticeResponse>>, ApiError> {
    let notices = NoticeService::new(&state.db).list_page(page).await?;
    Ok(Json(notices.into_iter().map(NoticeResponse::from).collect()))
}

/// GET /api/notice/page_count
pub async fn page_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PageCountResponse>, ApiError> {
    let page_count = NoticeService::new(&state.db).page_count().await?;
    Ok(Json(PageCountResponse { page_count }))
}

/// GET /api/notice/verify - 200 for admins, 401 otherwise.
pub async fn verify_admin(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<StatusCode, ApiError> {
    NoticeService::new(&state.db)
        .verify_admin(principal.user_id)
        .await?;
    Ok(StatusCode::OK)
}

/// PUT /api/notice/:noticeId
pub async fn update_notice(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(notice_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<StatusCode, ApiError> {
    let draft = PostDraft::new(req.title, req.content);
    NoticeService::new(&state.db)
        .update(principal.user_id, notice_id, &draft)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/notice/:noticeId
pub async fn delete_notice(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedPath(notice_id): ValidatedPath<i64>,
) -> Result<StatusCode, ApiError> {
    NoticeService::new(&state.db)
        .delete(principal.user_id, notice_id)
        .await?;
    Ok(StatusCode::OK)
}
