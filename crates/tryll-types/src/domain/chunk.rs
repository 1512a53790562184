use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One element of the `GET /chunks` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDetail {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChunkDetail {
    pub fn text_or_placeholder(&self) -> &str {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => "No text available",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chunk_without_metadata() {
        let chunk: ChunkDetail = serde_json::from_str(r#"{"id": "c1"}"#).unwrap();
        assert_eq!(chunk.id, "c1");
        assert_eq!(chunk.text_or_placeholder(), "No text available");
        assert_eq!(chunk.metadata.kind, None);
    }

    #[test]
    fn test_parse_chunk_metadata() {
        let chunk: ChunkDetail = serde_json::from_str(
            r#"{"id": "c2", "text": "body", "metadata": {"type": "wiki", "page_title": "Sword", "section": 3}}"#,
        )
        .unwrap();
        assert_eq!(chunk.metadata.kind.as_deref(), Some("wiki"));
        assert_eq!(chunk.metadata.page_title.as_deref(), Some("Sword"));
        assert_eq!(chunk.metadata.extra.get("section").unwrap(), 3);
    }
}
