//! Middleware for the Web API.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{jwt_auth, AuthUser, DecryptedId, Principal};
pub use cors::create_cors_layer;
pub use rate_limit::{rate_limit, LimitClass, RateLimitState};
pub use security::security_headers;
