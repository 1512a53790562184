use chrono::{DateTime, Utc};
use tryll_types::Turn;

const CHUNK_ID_SEPARATOR: char = ';';

/// In-flight streamed answer (at most one per session)
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    started_at: DateTime<Utc>,
    text: String,
    token_count: usize,
}

impl StreamBuilder {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            text: String::new(),
            token_count: 0,
        }
    }

    pub fn push_token(&mut self, token: &str) {
        self.text.push_str(token);
        self.token_count += 1;
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    /// Finalize into an assistant turn. A stream that never received a token
    /// produces no turn.
    pub fn build(self, rag_chunk_ids: Vec<String>, finished_at: DateTime<Utc>) -> Option<Turn> {
        if self.is_empty() {
            return None;
        }

        Some(Turn::assistant(self.text, rag_chunk_ids, finished_at))
    }
}

/// Parse a finish-streaming payload (`id1;id2;...`), dropping empty segments
pub fn parse_chunk_ids(payload: &str) -> Vec<String> {
    payload
        .split(CHUNK_ID_SEPARATOR)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}
