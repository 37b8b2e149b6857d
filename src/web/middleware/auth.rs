//! JWT authentication middleware.
//!
//! [`jwt_auth`] never rejects a request. It resolves a bearer token to a
//! [`Principal`] when it can; handlers that need a caller ask for one with
//! the [`AuthUser`] extractor.

use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::db::{Role, UserRepository};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use crate::ErrorMessage;

/// Paths the middleware does not look at.
const PUBLIC_PREFIXES: &[&str] = &["/api/mail", "/health"];

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn resolve_principal(state: &AppState, token: &str) -> Option<Principal> {
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(_) => {
            tracing::debug!("ignoring invalid or expired token");
            return None;
        }
    };

    match UserRepository::new(state.db.pool()).get_by_id(claims.sub).await {
        Ok(Some(user)) => Some(Principal {
            user_id: user.id,
            role: user.role,
        }),
        Ok(None) => {
            tracing::debug!(user_id = claims.sub, "token subject no longer exists");
            None
        }
        Err(e) => {
            tracing::warn!(user_id = claims.sub, error = %e, "failed to load token subject");
            None
        }
    }
}

/// Middleware that attaches a [`Principal`] for valid bearer tokens.
pub async fn jwt_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !is_public(request.uri().path()) {
        let principal = match bearer_token(&request) {
            Some(token) => resolve_principal(&state, token).await,
            None => None,
        };
        if let Some(principal) = principal {
            request.extensions_mut().insert(principal);
        }
    }
    next.run(request).await
}

/// Extractor for authenticated users.
///
/// Rejects with `401 ERR_UNAUTHORIZED` when the middleware found no caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized(ErrorMessage::ErrUnauthorized))
    }
}

/// Path extractor for a single encrypted id segment.
///
/// Any segment that does not decrypt answers
/// `500 ERR_INTERNAL_SERVER_DECRYPTION_ERROR`.
#[derive(Debug, Clone, Copy)]
pub struct DecryptedId(pub i64);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for DecryptedId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Path(encrypted) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(ErrorMessage::ErrInvalidQueryParameter))?;

        state.ids.decrypt(&encrypted).map(DecryptedId).map_err(|e| {
            tracing::warn!(error = %e, "failed to decrypt path id");
            ApiError::internal(ErrorMessage::ErrInternalServerDecryptionError)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::mail::LogMailer;
    use crate::Config;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::util::ServiceExt;

    async fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.jwt.secret = "jwt-secret".to_string();
        config.id_cipher.secret = "id-secret".to_string();
        let db = crate::Database::open_in_memory().await.unwrap();
        Arc::new(AppState::new(&config, db, Arc::new(LogMailer)).unwrap())
    }

    async fn whoami(AuthUser(principal): AuthUser) -> String {
        format!("{}:{}", principal.user_id, principal.role)
    }

    async fn store(DecryptedId(id): DecryptedId) -> String {
        id.to_string()
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/me", get(whoami))
            .route("/api/mail/me", get(whoami))
            .route("/api/store/:id", get(store))
            .layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_is_public() {
        assert!(is_public("/api/mail"));
        assert!(is_public("/api/mail/verify"));
        assert!(is_public("/health"));
        assert!(!is_public("/api/mailbox"));
        assert!(!is_public("/api/user"));
    }

    #[tokio::test]
    async fn test_valid_token_sets_principal() {
        let state = test_state().await;
        let user = UserRepository::new(state.db.pool())
            .create(&NewUser::new("owner@example.com", "owner", "hash"))
            .await
            .unwrap();
        let token = state.tokens.issue(user.id).unwrap();

        let (status, body) = call(app(state), "/api/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{}:USER", user.id));
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let state = test_state().await;

        let (status, body) = call(app(state.clone()), "/api/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("ERR_UNAUTHORIZED"));

        let (status, _) = call(app(state), "/api/me", Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_ignored() {
        let state = test_state().await;
        let token = state.tokens.issue(999).unwrap();
        let (status, _) = call(app(state), "/api/me", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mail_paths_skip_authentication() {
        let state = test_state().await;
        let user = UserRepository::new(state.db.pool())
            .create(&NewUser::new("owner@example.com", "owner", "hash"))
            .await
            .unwrap();
        let token = state.tokens.issue(user.id).unwrap();

        let (status, _) = call(app(state), "/api/mail/me", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_decrypted_id() {
        let state = test_state().await;
        let encrypted = state.ids.encrypt(42).unwrap();

        let (status, body) = call(app(state.clone()), &format!("/api/store/{encrypted}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");

        let (status, body) = call(app(state), "/api/store/not-a-real-id", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("ERR_INTERNAL_SERVER_DECRYPTION_ERROR"));
    }
}
