//! StoreLens - backend-for-frontend gateway for a small-business analytics platform.
//!
//! Accounts, a bulletin board, notices and an authenticated reverse proxy
//! to the analytics service, served over a REST API.

pub mod auth;
pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod notice;
pub mod proxy;
pub mod user;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::{Database, Role, User, UserRepository};
pub use error::{ErrorMessage, Result, StoreLensError};
