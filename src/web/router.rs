//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use super::error::ApiError;
use super::handlers::{board, comment, mail, notice, proxy, user};
use super::middleware::{create_cors_layer, jwt_auth, rate_limit, security_headers, RateLimitState};
use super::state::AppState;
use crate::config::ServerConfig;
use crate::ErrorMessage;

fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(user::sign_up)
                .get(user::get_info)
                .delete(user::delete_user),
        )
        .route("/name/check", post(user::check_name))
        .route("/login", post(user::login))
        .route("/name", put(user::update_name))
        .route("/password", put(user::update_password))
}

fn mail_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(mail::send_code))
        .route("/verify", post(mail::verify_code))
}

fn board_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(board::create_post))
        .route("/page/:page", get(board::list_posts))
        .route("/page_count", get(board::page_count))
        .route(
            "/:id",
            get(board::get_post)
                .put(board::update_post)
                .delete(board::delete_post),
        )
}

// One route: the id is a board id for GET/POST and a comment id for PATCH/DELETE.
fn comment_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/:id",
        get(comment::list_comments)
            .post(comment::create_comment)
            .patch(comment::update_comment)
            .delete(comment::delete_comment),
    )
}

fn notice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(notice::create_notice))
        .route("/verify", get(notice::verify_admin))
        .route("/page/:page", get(notice::list_notices))
        .route("/page_count", get(notice::page_count))
        .route(
            "/:id",
            get(notice::get_notice)
                .put(notice::update_notice)
                .delete(notice::delete_notice),
        )
}

fn proxy_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Sales analysis
        .route("/analysis", post(proxy::combined_analysis))
        .route("/analysis/latest", get(proxy::latest_analysis))
        .route("/analysis/:id", get(proxy::analysis_result))
        // Chat
        .route("/chat", post(proxy::chat))
        // Competitors
        .route("/competitor/analysis", post(proxy::competitor_analysis))
        .route("/competitor/comparison/:id", get(proxy::competitor_comparison))
        .route("/competitor/:id", get(proxy::competitor_list))
        // Reviews
        .route("/reviews", post(proxy::review_analysis))
        .route("/reviews/store/:id", get(proxy::store_reviews))
        .route("/reviews/analysis/:id", get(proxy::review_analysis_result))
        // Stores
        .route("/store/register-with-business", post(proxy::register_store))
        .route("/store/list", get(proxy::store_list))
        .route("/store/detail/:id", get(proxy::store_detail))
        .route("/store/analysis-list/:id", get(proxy::store_analysis_list))
        // Location
        .route("/location/recommend", post(proxy::location_recommend))
        .route("/location/map", post(proxy::location_map))
}

/// Create the main API router with all cross-cutting layers.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limits: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let api_routes = Router::new()
        .nest("/user", user_routes())
        .nest("/mail", mail_routes())
        .nest("/board", board_routes())
        .nest("/comment", comment_routes())
        .nest("/notice", notice_routes())
        .nest("/proxy", proxy_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .fallback(unknown_route)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(CompressionLayer::new())
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn_with_state(rate_limits, rate_limit))
                .layer(middleware::from_fn_with_state(app_state.clone(), jwt_auth)),
        )
        .with_state(app_state)
}

/// Create the router with rate limits taken from the server configuration.
pub fn create_app(app_state: Arc<AppState>, config: &ServerConfig) -> Router {
    let rate_limits = Arc::new(RateLimitState::new(
        config.login_rate_limit,
        config.api_rate_limit,
    ));
    create_router(app_state, rate_limits, &config.cors_origins)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn unknown_route() -> ApiError {
    ApiError::not_found(ErrorMessage::ErrNotResource)
}
