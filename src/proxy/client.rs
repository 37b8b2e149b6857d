//! HTTP client for the analytics service.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::AnalyticsConfig;
use crate::{Result, StoreLensError};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "storelens-gateway/0.1";

/// Upstream failure. Bodies of error responses are kept for logging only.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream body is not valid JSON: {0}")]
    Decode(String),
}

/// A successful upstream response, relayed to the client as is.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Value,
}

/// Thin wrapper over reqwest bound to the analytics base URL.
#[derive(Clone)]
pub struct AnalyticsClient {
    client: Client,
    base_url: Url,
}

impl AnalyticsClient {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            StoreLensError::Config(format!("invalid analytics.base_url: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreLensError::Config(format!(
                "analytics.base_url cannot be a base: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreLensError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Build an upstream URL from path segments. Each segment is
    /// percent-encoded, so client-supplied ids cannot alter the path.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> std::result::Result<Relayed, UpstreamError> {
        let request = self.client.get(self.url(segments)).query(query);
        Self::execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> std::result::Result<Relayed, UpstreamError> {
        let request = self.client.post(self.url(segments)).json(body);
        Self::execute(request).await
    }

    async fn execute(request: RequestBuilder) -> std::result::Result<Relayed, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?
        };

        Ok(Relayed { status, body })
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;

    fn config(base_url: &str) -> AnalyticsConfig {
        AnalyticsConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/api/echo/:id",
                get(|Path(id): Path<String>| async move { Json(json!({ "id": id })) }),
            )
            .route(
                "/api/fail",
                get(|| async { (AxumStatus::BAD_GATEWAY, "boom") }),
            )
            .route("/api/text", get(|| async { "plain text" }))
            .route(
                "/api/created",
                axum::routing::post(|Json(v): Json<Value>| async move {
                    (AxumStatus::CREATED, Json(v))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_url_building_encodes_segments() {
        let client = AnalyticsClient::new(&config("http://analytics:8000/")).unwrap();
        let url = client.url(&["api", "eda", "results", "a/b?c"]);
        assert_eq!(url.as_str(), "http://analytics:8000/api/eda/results/a%2Fb%3Fc");
    }

    #[test]
    fn test_url_keeps_base_prefix() {
        let client = AnalyticsClient::new(&config("http://analytics:8000/v1")).unwrap();
        let url = client.url(&["api", "chat"]);
        assert_eq!(url.as_str(), "http://analytics:8000/v1/api/chat");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(AnalyticsClient::new(&config("not a url")).is_err());
        assert!(AnalyticsClient::new(&config("mailto:x@example.com")).is_err());
    }

    #[tokio::test]
    async fn test_get_relays_body() {
        let base = spawn_upstream().await;
        let client = AnalyticsClient::new(&config(&base)).unwrap();

        let relayed = client.get(&["api", "echo", "42"], &[]).await.unwrap();
        assert_eq!(relayed.status, StatusCode::OK);
        assert_eq!(relayed.body, json!({ "id": "42" }));
    }

    #[tokio::test]
    async fn test_post_relays_status() {
        let base = spawn_upstream().await;
        let client = AnalyticsClient::new(&config(&base)).unwrap();

        let relayed = client
            .post(&["api", "created"], &json!({ "a": 1 }))
            .await
            .unwrap();
        assert_eq!(relayed.status, StatusCode::CREATED);
        assert_eq!(relayed.body, json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let base = spawn_upstream().await;
        let client = AnalyticsClient::new(&config(&base)).unwrap();

        match client.get(&["api", "fail"], &[]).await {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let base = spawn_upstream().await;
        let client = AnalyticsClient::new(&config(&base)).unwrap();
        assert!(matches!(
            client.get(&["api", "text"], &[]).await,
            Err(UpstreamError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnalyticsClient::new(&config(&format!("http://{addr}"))).unwrap();
        assert!(matches!(
            client.get(&["api"], &[]).await,
            Err(UpstreamError::Transport(_))
        ));
    }
}
