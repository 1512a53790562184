//! Sample payloads of the HTTP side-channel endpoints.

use serde_json::{Value, json};

/// `GET /config` body without a tunnel (stream goes through the local proxy)
pub fn local_config() -> Value {
    json!({
        "rag_chunks_number": 5,
        "rag_score_threshold": 0.35,
        "rag_double_tower": false,
        "embedding_model_name": "bge-m3",
        "semantic_filter_threshold": 0.5
    })
}

/// `GET /config` body advertising a public tunnel
pub fn tunnel_config(tunnel_url: &str) -> Value {
    let mut config = local_config();
    config["tunnel_url"] = Value::String(tunnel_url.to_string());
    config
}

/// `GET /chunks` body for the given ids
pub fn chunks(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                json!({
                    "id": id,
                    "text": format!("Chunk text number {}", i + 1),
                    "metadata": {"type": "wiki", "page_title": format!("Page {}", i + 1)}
                })
            })
            .collect(),
    )
}
