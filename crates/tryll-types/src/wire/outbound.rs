use serde::{Deserialize, Serialize};

use crate::domain::ServerConfig;

/// Outbound chat request, sent as one JSON object per transport frame
/// (no trailing separator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub agent_message: AgentMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Agent id reported by the server, 0 when none was assigned
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Thumbs up/down on a single answer
    Quick,
    /// Free-text critique from the feedback form
    Detailed,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Quick => "quick",
            FeedbackKind::Detailed => "detailed",
        }
    }
}

/// Body of `POST /feedback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub rag_chunk_ids: Vec<String>,
    pub is_positive: bool,
    pub feedback_type: FeedbackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_answer: Option<String>,
    /// Snapshot of the server configuration at submission time
    pub server_config: Option<ServerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            agent_message: AgentMessage {
                id: 0,
                message: "hello".to_string(),
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"agent_message":{"id":0,"message":"hello"}}"#);
    }

    #[test]
    fn test_quick_feedback_omits_optional_text() {
        let record = FeedbackRecord {
            session_id: "2026-01-01T00:00:00Z".to_string(),
            question: "q".to_string(),
            answer: "a".to_string(),
            rag_chunk_ids: vec!["c1".to_string()],
            is_positive: true,
            feedback_type: FeedbackKind::Quick,
            feedback_text: None,
            suggested_answer: None,
            server_config: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["feedback_type"], "quick");
        assert!(value.get("feedback_text").is_none());
        assert!(value.get("suggested_answer").is_none());
        assert!(value["server_config"].is_null());
    }
}
