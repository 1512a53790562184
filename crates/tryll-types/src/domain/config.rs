use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Capability snapshot reported by `GET /config`.
///
/// Every field is optional: the backend reads these from a hand-edited file and
/// may omit any of them or write `5.0` where `5` is meant. Only `tunnel_url`
/// drives behavior; the tuning values are kept as raw JSON for display and are
/// echoed back verbatim in feedback payloads, as are unknown keys in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Public tunnel base URL; when present the stream connects through it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_chunks_number: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_score_threshold: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_double_tower: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model_name: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_filter_threshold: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerConfig {
    /// Tunnel URL, ignoring blank values
    pub fn tunnel(&self) -> Option<&str> {
        self.tunnel_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// The proxy answers `{"error": "..."}` when it cannot read its config file
    pub fn error(&self) -> Option<&str> {
        self.extra.get("error").and_then(Value::as_str)
    }
}
