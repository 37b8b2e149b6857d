//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};
use tokio::task::JoinHandle;

use crate::web::error::ApiError;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Which budget a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitClass {
    /// Login and verification mail: brute-force and mail-bombing targets.
    Login,
    Api,
}

impl LimitClass {
    pub fn for_path(path: &str) -> Self {
        let is_mail = path
            .strip_prefix("/api/mail")
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if path == "/api/user/login" || is_mail {
            LimitClass::Login
        } else {
            LimitClass::Api
        }
    }
}

/// State for rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP rate limiters for login and mail endpoints.
    login_limiters: Arc<DashMap<String, Arc<IpRateLimiter>>>,
    /// Per-IP rate limiters for the rest of the API.
    api_limiters: Arc<DashMap<String, Arc<IpRateLimiter>>>,
    /// Login rate limit (requests per minute).
    login_rate_limit: u32,
    /// API rate limit (requests per minute).
    api_rate_limit: u32,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(login_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login_limiters: Arc::new(DashMap::new()),
            api_limiters: Arc::new(DashMap::new()),
            login_rate_limit,
            api_rate_limit,
        }
    }

    fn get_or_create_limiter(
        limiters: &DashMap<String, Arc<IpRateLimiter>>,
        ip: &str,
        requests_per_minute: u32,
    ) -> Arc<IpRateLimiter> {
        if let Some(limiter) = limiters.get(ip) {
            return limiter.clone();
        }

        limiters
            .entry(ip.to_string())
            .or_insert_with(|| {
                let quota = Quota::per_minute(
                    NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
                );
                Arc::new(RateLimiter::direct(quota))
            })
            .clone()
    }

    /// Check if a request is allowed for login endpoint.
    pub fn check_login(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.login_limiters, ip, self.login_rate_limit);
        limiter.check().is_ok()
    }

    /// Check if a request is allowed for general API.
    pub fn check_api(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.api_limiters, ip, self.api_rate_limit);
        limiter.check().is_ok()
    }

    pub fn check(&self, class: LimitClass, ip: &str) -> bool {
        match class {
            LimitClass::Login => self.check_login(ip),
            LimitClass::Api => self.check_api(ip),
        }
    }

    /// Drop limiters no request is currently holding.
    pub fn cleanup(&self) -> usize {
        let before = self.login_limiters.len() + self.api_limiters.len();
        self.login_limiters.retain(|_, v| Arc::strong_count(v) > 1);
        self.api_limiters.retain(|_, v| Arc::strong_count(v) > 1);
        before.saturating_sub(self.login_limiters.len() + self.api_limiters.len())
    }

    /// Start a background task that cleans up every 5 minutes.
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = self.cleanup();
                if removed > 0 {
                    tracing::debug!(removed, "Cleaned up idle rate limiters");
                }
            }
        })
    }
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Reverse proxy headers first
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware. Over the limit answers `429 ERR_TOO_MANY_REQUESTS`.
pub async fn rate_limit(
    State(state): State<Arc<RateLimitState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);
    let class = LimitClass::for_path(req.uri().path());

    if !state.check(class, &ip) {
        tracing::warn!(ip = %ip, ?class, "Rate limit exceeded");
        return ApiError::too_many_requests().into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_state_new() {
        let state = RateLimitState::new(5, 100);
        assert_eq!(state.login_rate_limit, 5);
        assert_eq!(state.api_rate_limit, 100);
    }

    #[test]
    fn test_limit_class_for_path() {
        assert_eq!(LimitClass::for_path("/api/user/login"), LimitClass::Login);
        assert_eq!(LimitClass::for_path("/api/mail"), LimitClass::Login);
        assert_eq!(LimitClass::for_path("/api/mail/verify"), LimitClass::Login);
        assert_eq!(LimitClass::for_path("/api/user"), LimitClass::Api);
        assert_eq!(LimitClass::for_path("/api/mailer"), LimitClass::Api);
        assert_eq!(LimitClass::for_path("/api/board/page/1"), LimitClass::Api);
    }

    #[test]
    fn test_login_rate_limit() {
        let state = RateLimitState::new(3, 100);

        assert!(state.check_login("127.0.0.1"));
        assert!(state.check_login("127.0.0.1"));
        assert!(state.check_login("127.0.0.1"));

        // 4th request should fail
        assert!(!state.check_login("127.0.0.1"));

        // Different IP should work
        assert!(state.check_login("192.168.1.1"));
    }

    #[test]
    fn test_budgets_are_separate() {
        let state = RateLimitState::new(1, 3);

        assert!(state.check(LimitClass::Login, "127.0.0.1"));
        assert!(!state.check(LimitClass::Login, "127.0.0.1"));
        assert!(state.check(LimitClass::Api, "127.0.0.1"));
    }

    #[test]
    fn test_cleanup_drops_idle_limiters() {
        let state = RateLimitState::new(5, 5);
        state.check_login("10.0.0.1");
        state.check_api("10.0.0.2");

        assert_eq!(state.cleanup(), 2);
        assert!(state.login_limiters.is_empty());
        assert!(state.api_limiters.is_empty());
    }
}
