//! Web server for StoreLens.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{Config, Result, StoreLensError};

use super::middleware::RateLimitState;
use super::router::create_router;
use super::state::AppState;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Server configuration.
    server_config: ServerConfig,
    /// Interval of the verification code sweep.
    code_cleanup_interval: Duration,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| StoreLensError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            server_config: config.server.clone(),
            code_cleanup_interval: Duration::from_secs(
                config.verification.cleanup_interval_secs.max(1),
            ),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind, start the background tasks and build the router.
    async fn prepare(self) -> std::io::Result<(TcpListener, Router)> {
        let rate_limits = Arc::new(RateLimitState::new(
            self.server_config.login_rate_limit,
            self.server_config.api_rate_limit,
        ));
        let router = create_router(
            self.app_state.clone(),
            rate_limits.clone(),
            &self.server_config.cors_origins,
        );

        let listener = TcpListener::bind(self.addr).await?;

        // Background tasks start only after a successful bind
        self.app_state
            .codes()
            .start_cleanup_task(self.code_cleanup_interval);
        tracing::info!(
            interval_secs = self.code_cleanup_interval.as_secs(),
            "Verification code cleanup task started"
        );
        rate_limits.start_cleanup_task();

        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.prepare().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.prepare().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
