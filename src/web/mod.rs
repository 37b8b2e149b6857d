//! Web API module for StoreLens.
//!
//! REST endpoints for accounts, the board, notices and the analytics proxy,
//! plus the middleware stack around them.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use error::{ApiError, ProxyError};
pub use router::{create_app, create_router};
pub use server::WebServer;
pub use state::AppState;
