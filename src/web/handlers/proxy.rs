//! Proxy handlers for the analytics service.
//!
//! Every route requires a logged-in caller. Store ids arrive encrypted and
//! are decrypted here; user ids always come from the caller's token.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::proxy::dto::{
    ChatRequest, ChatResponse, CombinedAnalysisRequest, CompetitorAnalysisRequest,
    LatestAnalysisQuery, ReviewAnalysisRequest, StoreRegisterRequest, UpstreamChat,
    UpstreamCombinedAnalysis, UpstreamCompetitorAnalysis, UpstreamReviewAnalysis,
    UpstreamStoreRegister,
};
use crate::proxy::Relayed;
use crate::web::dto::{ValidatedJson, ValidatedPath};
use crate::web::error::{ApiError, ProxyError};
use crate::web::middleware::{AuthUser, DecryptedId};
use crate::web::state::AppState;
use crate::ErrorMessage;

type ProxyResult<T> = Result<T, ProxyError>;

fn decrypt_store_id(state: &AppState, encrypted: &str) -> Result<i64, ApiError> {
    state.ids.decrypt(encrypted).map_err(|e| {
        tracing::warn!(error = %e, "failed to decrypt store id");
        ApiError::internal(ErrorMessage::ErrInternalServerDecryptionError)
    })
}

fn raw_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value).map_err(|e| {
        tracing::debug!(error = %e, "rejected proxy body");
        ApiError::bad_request(ErrorMessage::ErrInvalidRequestField)
    })
}

// ============================================================================
// Sales analysis
// ============================================================================

/// POST /api/proxy/analysis
pub async fn combined_analysis(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedJson(req): ValidatedJson<CombinedAnalysisRequest>,
) -> ProxyResult<Relayed> {
    let upstream = UpstreamCombinedAnalysis {
        store_id: decrypt_store_id(&state, &req.store_id)?,
        source_ids: req.source_ids,
        pos_type: req.pos_type,
    };
    Ok(state.analytics.combined_analysis(&upstream).await?)
}

/// GET /api/proxy/analysis/latest?source_id=
pub async fn latest_analysis(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    query: Result<Query<LatestAnalysisQuery>, QueryRejection>,
) -> ProxyResult<Relayed> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "rejected query string");
        ApiError::bad_request(ErrorMessage::ErrInvalidQueryParameter)
    })?;
    Ok(state.analytics.latest_analysis(&query.source_id).await?)
}

/// GET /api/proxy/analysis/:analysisId
pub async fn analysis_result(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedPath(analysis_id): ValidatedPath<String>,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.analysis_result(&analysis_id).await?)
}

// ============================================================================
// Chat
// ============================================================================

/// POST /api/proxy/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> ProxyResult<Json<ChatResponse>> {
    let store_id = match req.store_id.as_deref() {
        Some(encrypted) => Some(decrypt_store_id(&state, encrypted)?),
        None => None,
    };
    let upstream = UpstreamChat {
        user_id: principal.user_id,
        message: req.message,
        session_id: req.session_id,
        store_id,
    };
    Ok(Json(state.analytics.chat(&upstream).await?))
}

// ============================================================================
// Competitors
// ============================================================================

/// GET /api/proxy/competitor/:storeId
pub async fn competitor_list(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    DecryptedId(store_id): DecryptedId,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.competitor_list(store_id).await?)
}

/// POST /api/proxy/competitor/analysis
pub async fn competitor_analysis(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedJson(req): ValidatedJson<CompetitorAnalysisRequest>,
) -> ProxyResult<Relayed> {
    let upstream = UpstreamCompetitorAnalysis {
        store_id: decrypt_store_id(&state, &req.store_id)?,
        competitor_name: req.competitor_name,
    };
    Ok(state.analytics.competitor_analysis(&upstream).await?)
}

/// GET /api/proxy/competitor/comparison/:comparisonId
pub async fn competitor_comparison(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedPath(comparison_id): ValidatedPath<String>,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.competitor_comparison(&comparison_id).await?)
}

// ============================================================================
// Reviews
// ============================================================================

/// POST /api/proxy/reviews
pub async fn review_analysis(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedJson(req): ValidatedJson<ReviewAnalysisRequest>,
) -> ProxyResult<Relayed> {
    let upstream = UpstreamReviewAnalysis {
        store_id: decrypt_store_id(&state, &req.store_id)?,
        place_id: req.place_id,
    };
    Ok(state.analytics.review_analysis(&upstream).await?)
}

/// GET /api/proxy/reviews/store/:storeId
pub async fn store_reviews(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    DecryptedId(store_id): DecryptedId,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.store_reviews(store_id).await?)
}

/// GET /api/proxy/reviews/analysis/:analysisId
pub async fn review_analysis_result(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    ValidatedPath(analysis_id): ValidatedPath<String>,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.review_analysis_result(&analysis_id).await?)
}

// ============================================================================
// Stores
// ============================================================================

/// POST /api/proxy/store/register-with-business
pub async fn register_store(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<StoreRegisterRequest>,
) -> ProxyResult<Relayed> {
    let upstream = UpstreamStoreRegister {
        user_id: principal.user_id,
        store_name: req.store_name,
        business_number: req.business_number,
        pos_type: req.pos_type,
    };
    Ok(state.analytics.register_store(&upstream).await?)
}

/// GET /api/proxy/store/list - Stores owned by the caller.
pub async fn store_list(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.store_list(principal.user_id).await?)
}

/// GET /api/proxy/store/detail/:storeId
pub async fn store_detail(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    DecryptedId(store_id): DecryptedId,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.store_detail(store_id).await?)
}

/// GET /api/proxy/store/analysis-list/:storeId
pub async fn store_analysis_list(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    DecryptedId(store_id): DecryptedId,
) -> ProxyResult<Relayed> {
    Ok(state.analytics.store_analysis_list(store_id).await?)
}

// ============================================================================
// Location
// ============================================================================

/// POST /api/proxy/location/recommend - Body forwarded verbatim.
pub async fn location_recommend(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ProxyResult<Relayed> {
    let body = raw_body(body)?;
    Ok(state.analytics.location_recommend(&body).await?)
}

/// POST /api/proxy/location/map - Body forwarded verbatim.
pub async fn location_map(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ProxyResult<Relayed> {
    let body = raw_body(body)?;
    Ok(state.analytics.location_map(&body).await?)
}
