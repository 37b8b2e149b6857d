//! Proxy operations against the analytics service.
//!
//! Every failure, whether an upstream error status, a transport error or an
//! undecodable body, is logged with the upstream detail and collapsed into a
//! [`ProxyFailure`] carrying only a human-readable context and an error code.

use serde_json::Value;
use tracing::{error, info};

use super::client::{AnalyticsClient, Relayed, UpstreamError};
use super::dto::{
    ChatResponse, UpstreamChat, UpstreamCombinedAnalysis, UpstreamCompetitorAnalysis,
    UpstreamReviewAnalysis, UpstreamStoreRegister,
};
use crate::auth::{IdCipher, IdCipherError};
use crate::ErrorMessage;

/// A proxy call that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyFailure {
    /// What the gateway was trying to do.
    pub context: &'static str,
    pub code: ErrorMessage,
}

impl ProxyFailure {
    pub fn new(context: &'static str, code: ErrorMessage) -> Self {
        Self { context, code }
    }
}

fn collapse(context: &'static str) -> impl FnOnce(UpstreamError) -> ProxyFailure {
    move |e| {
        match &e {
            UpstreamError::Status { status, body } => {
                error!(context, %status, body = %body, "analytics service returned an error");
            }
            other => error!(context, error = %other, "analytics request failed"),
        }
        ProxyFailure::new(context, ErrorMessage::ErrInternalServerError)
    }
}

/// Replace every integer `store_id` in `value` with its encrypted form.
fn encrypt_store_ids(value: &mut Value, ids: &IdCipher) -> Result<(), IdCipherError> {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if key == "store_id" {
                    if let Some(id) = field.as_i64() {
                        *field = Value::String(ids.encrypt(id)?);
                        continue;
                    }
                }
                encrypt_store_ids(field, ids)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                encrypt_store_ids(item, ids)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Gateway to the analytics service, one method per proxied operation.
#[derive(Clone, Debug)]
pub struct AnalyticsService {
    client: AnalyticsClient,
    ids: IdCipher,
}

impl AnalyticsService {
    pub fn new(client: AnalyticsClient, ids: IdCipher) -> Self {
        Self { client, ids }
    }

    /// Store endpoints return plain store ids; clients only ever see encrypted ones.
    fn with_encrypted_store_ids(
        &self,
        mut relayed: Relayed,
        context: &'static str,
    ) -> Result<Relayed, ProxyFailure> {
        encrypt_store_ids(&mut relayed.body, &self.ids).map_err(|e| {
            error!(context, error = %e, "failed to encrypt store ids in upstream response");
            ProxyFailure::new(context, ErrorMessage::ErrInternalServerEncryptionError)
        })?;
        Ok(relayed)
    }

    // ------------------------------------------------------------------------
    // Sales analysis
    // ------------------------------------------------------------------------

    pub async fn combined_analysis(
        &self,
        request: &UpstreamCombinedAnalysis,
    ) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "combined analysis failed";
        info!(store_id = request.store_id, sources = request.source_ids.len(), "combined analysis requested");
        self.client
            .post(&["api", "eda", "analyze", "combined"], request)
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn latest_analysis(&self, source_id: &str) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the latest analysis failed";
        self.client
            .get(&["api", "eda", "latest"], &[("source_id", source_id.to_string())])
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn analysis_result(&self, analysis_id: &str) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the analysis result failed";
        self.client
            .get(&["api", "eda", "results", analysis_id], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    pub async fn chat(&self, request: &UpstreamChat) -> Result<ChatResponse, ProxyFailure> {
        const CONTEXT: &str = "chat request failed";
        let relayed = self
            .client
            .post(&["api", "chat"], request)
            .await
            .map_err(collapse(CONTEXT))?;

        serde_json::from_value(relayed.body)
            .map_err(|e| UpstreamError::Decode(e.to_string()))
            .map_err(collapse(CONTEXT))
    }

    // ------------------------------------------------------------------------
    // Competitors
    // ------------------------------------------------------------------------

    pub async fn competitor_list(&self, store_id: i64) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching competitor comparisons failed";
        let id = store_id.to_string();
        self.client
            .get(&["api", "competitor", id.as_str()], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn competitor_analysis(
        &self,
        request: &UpstreamCompetitorAnalysis,
    ) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "competitor analysis failed";
        self.client
            .post(&["api", "competitor", "analyze"], request)
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn competitor_comparison(&self, comparison_id: &str) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the comparison result failed";
        self.client
            .get(&["api", "competitor", "comparison", comparison_id], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    // ------------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------------

    pub async fn review_analysis(
        &self,
        request: &UpstreamReviewAnalysis,
    ) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "review analysis failed";
        self.client
            .post(&["api", "reviews", "analyze"], request)
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn store_reviews(&self, store_id: i64) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching store reviews failed";
        let id = store_id.to_string();
        self.client
            .get(&["api", "reviews", "store", id.as_str()], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn review_analysis_result(&self, analysis_id: &str) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the review analysis failed";
        self.client
            .get(&["api", "reviews", "analysis", analysis_id], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    // ------------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------------

    pub async fn register_store(
        &self,
        request: &UpstreamStoreRegister,
    ) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "store registration failed";
        let relayed = self
            .client
            .post(&["api", "store", "register-with-business"], request)
            .await
            .map_err(collapse(CONTEXT))?;
        self.with_encrypted_store_ids(relayed, CONTEXT)
    }

    pub async fn store_list(&self, user_id: i64) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the store list failed";
        let relayed = self
            .client
            .get(&["api", "store", "list"], &[("user_id", user_id.to_string())])
            .await
            .map_err(collapse(CONTEXT))?;
        self.with_encrypted_store_ids(relayed, CONTEXT)
    }

    pub async fn store_detail(&self, store_id: i64) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching store details failed";
        let id = store_id.to_string();
        let relayed = self
            .client
            .get(&["api", "store", "detail", id.as_str()], &[])
            .await
            .map_err(collapse(CONTEXT))?;
        self.with_encrypted_store_ids(relayed, CONTEXT)
    }

    pub async fn store_analysis_list(&self, store_id: i64) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "fetching the store analysis list failed";
        let id = store_id.to_string();
        self.client
            .get(&["api", "store", "analysis-list", id.as_str()], &[])
            .await
            .map_err(collapse(CONTEXT))
    }

    // ------------------------------------------------------------------------
    // Location recommendation
    // ------------------------------------------------------------------------

    pub async fn location_recommend(&self, body: &Value) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "location recommendation failed";
        self.client
            .post(&["api", "location", "recommend"], body)
            .await
            .map_err(collapse(CONTEXT))
    }

    pub async fn location_map(&self, body: &Value) -> Result<Relayed, ProxyFailure> {
        const CONTEXT: &str = "map recommendation failed";
        self.client
            .post(&["api", "location", "map"], body)
            .await
            .map_err(collapse(CONTEXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/api/chat",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "session_id": "s-1",
                        "bot_message": format!("echo {}", body["message"].as_str().unwrap_or("")),
                        "message_type": "text",
                        "user_id": body["user_id"],
                    }))
                }),
            )
            .route(
                "/api/store/list",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "user_id": q.get("user_id"),
                        "stores": [ { "store_id": 11, "store_name": "cafe" } ]
                    }))
                }),
            )
            .route(
                "/api/eda/results/:id",
                get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "missing" }))) }),
            )
            .route(
                "/api/location/map",
                post(|Json(body): Json<Value>| async move { Json(body) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn ids() -> IdCipher {
        IdCipher::new("id-secret", "id-salt")
    }

    async fn service() -> AnalyticsService {
        let base_url = spawn_upstream().await;
        let client = AnalyticsClient::new(&AnalyticsConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap();
        AnalyticsService::new(client, ids())
    }

    #[test]
    fn test_encrypt_store_ids_nested() {
        let ids = ids();
        let mut value = json!({
            "store_id": 5,
            "stores": [ { "store_id": 6, "name": "a" }, { "store_id": "already" } ],
            "other_id": 7
        });
        encrypt_store_ids(&mut value, &ids).unwrap();

        assert_eq!(ids.decrypt(value["store_id"].as_str().unwrap()).unwrap(), 5);
        assert_eq!(
            ids.decrypt(value["stores"][0]["store_id"].as_str().unwrap())
                .unwrap(),
            6
        );
        assert_eq!(value["stores"][1]["store_id"], "already");
        assert_eq!(value["other_id"], 7);
    }

    #[tokio::test]
    async fn test_chat_decodes_reply() {
        let service = service().await;
        let reply = service
            .chat(&UpstreamChat {
                user_id: 3,
                message: "hello".to_string(),
                session_id: None,
                store_id: Some(9),
            })
            .await
            .unwrap();

        assert_eq!(reply.session_id.as_deref(), Some("s-1"));
        assert_eq!(reply.bot_message, "echo hello");
    }

    #[tokio::test]
    async fn test_store_list_encrypts_ids() {
        let service = service().await;
        let relayed = service.store_list(21).await.unwrap();

        assert_eq!(relayed.body["user_id"], "21");
        let token = relayed.body["stores"][0]["store_id"].as_str().unwrap();
        assert_eq!(ids().decrypt(token).unwrap(), 11);
    }

    #[tokio::test]
    async fn test_upstream_error_collapses() {
        let service = service().await;
        let failure = service.analysis_result("abc").await.unwrap_err();
        assert_eq!(failure.context, "fetching the analysis result failed");
        assert_eq!(failure.code, ErrorMessage::ErrInternalServerError);
    }

    #[tokio::test]
    async fn test_location_body_verbatim() {
        let service = service().await;
        let body = json!({ "district": "강남구", "industry": "cafe", "top_n": 3 });
        let relayed = service.location_map(&body).await.unwrap();
        assert_eq!(relayed.body, body);
    }
}
