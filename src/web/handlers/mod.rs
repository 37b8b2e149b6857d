//! API handlers, one module per route group.

pub mod board;
pub mod comment;
pub mod mail;
pub mod notice;
pub mod proxy;
pub mod user;
