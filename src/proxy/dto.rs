//! Request and response bodies of the proxy endpoints.
//!
//! Field names are snake_case to match the analytics service. Client-facing
//! bodies carry encrypted store ids; upstream bodies carry plain integers.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// POS system assumed when the client does not name one.
pub const DEFAULT_POS_TYPE: &str = "키움";

fn default_pos_type() -> String {
    DEFAULT_POS_TYPE.to_string()
}

// ============================================================================
// Client-facing requests
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CombinedAnalysisRequest {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1))]
    pub source_ids: Vec<String>,
    #[serde(default = "default_pos_type")]
    pub pos_type: String,
}

#[derive(Debug, Deserialize)]
pub struct LatestAnalysisQuery {
    pub source_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub store_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompetitorAnalysisRequest {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1, max = 100))]
    pub competitor_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewAnalysisRequest {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1))]
    pub place_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreRegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub store_name: String,
    #[validate(length(min = 1, max = 20))]
    pub business_number: String,
    #[serde(default = "default_pos_type")]
    pub pos_type: String,
}

// ============================================================================
// Upstream requests
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamCombinedAnalysis {
    pub store_id: i64,
    pub source_ids: Vec<String>,
    pub pos_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamChat {
    pub user_id: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamCompetitorAnalysis {
    pub store_id: i64,
    pub competitor_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamReviewAnalysis {
    pub store_id: i64,
    pub place_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamStoreRegister {
    pub user_id: i64,
    pub store_name: String,
    pub business_number: String,
    pub pos_type: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Chatbot reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub session_id: Option<String>,
    pub bot_message: String,
    pub message_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pos_type_defaults() {
        let req: CombinedAnalysisRequest =
            serde_json::from_value(json!({ "store_id": "x", "source_ids": ["s1"] })).unwrap();
        assert_eq!(req.pos_type, DEFAULT_POS_TYPE);

        let req: StoreRegisterRequest = serde_json::from_value(
            json!({ "store_name": "cafe", "business_number": "123", "pos_type": "토스" }),
        )
        .unwrap();
        assert_eq!(req.pos_type, "토스");
    }

    #[test]
    fn test_upstream_chat_omits_missing_fields() {
        let body = UpstreamChat {
            user_id: 7,
            message: "hi".to_string(),
            session_id: None,
            store_id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "user_id": 7, "message": "hi" })
        );
    }

    #[test]
    fn test_combined_analysis_requires_sources() {
        let req: CombinedAnalysisRequest =
            serde_json::from_value(json!({ "store_id": "x", "source_ids": [] })).unwrap();
        assert!(req.validate().is_err());
    }
}
