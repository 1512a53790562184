//! Inbound frame construction.
//!
//! ```
//! use tryll_testing::FrameBuilder;
//!
//! let frame = FrameBuilder::new().server(1).start().token("Hi").finish("c1;c2").build();
//! assert!(frame.ends_with("},"));
//! ```

use serde_json::{Value, json};
use tryll_types::AgentState;

/// Builds one raw frame: every object followed by `,`, no brackets
#[derive(Debug, Default, Clone)]
pub struct FrameBuilder {
    objects: Vec<Value>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, state: i64) -> Self {
        self.objects.push(json!({"server": {"state": state}}));
        self
    }

    pub fn ready(self) -> Self {
        self.server(1)
    }

    pub fn busy(self) -> Self {
        self.server(3)
    }

    pub fn models(mut self, models: &[&str]) -> Self {
        self.objects.push(json!({"models": models}));
        self
    }

    pub fn agent(mut self, state: AgentState, message: &str) -> Self {
        self.objects
            .push(json!({"agent": {"state": state.code(), "message": message}}));
        self
    }

    pub fn agent_with_id(mut self, state: AgentState, message: &str, id: u64) -> Self {
        self.objects
            .push(json!({"agent": {"state": state.code(), "message": message, "id": id}}));
        self
    }

    pub fn full_message(self, text: &str) -> Self {
        self.agent(AgentState::FullMessage, text)
    }

    pub fn start(self) -> Self {
        self.agent(AgentState::StartStreaming, "")
    }

    pub fn token(self, text: &str) -> Self {
        self.agent(AgentState::Token, text)
    }

    pub fn finish(self, chunk_ids: &str) -> Self {
        self.agent(AgentState::FinishStreaming, chunk_ids)
    }

    pub fn data_source(self, text: &str) -> Self {
        self.agent(AgentState::DataSource, text)
    }

    /// Arbitrary object, e.g. keys the client does not know
    pub fn raw(mut self, value: Value) -> Self {
        self.objects.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn build(&self) -> String {
        self.objects
            .iter()
            .map(|object| format!("{},", object))
            .collect()
    }
}

/// One frame per event, as a server that flushes after every object would send
pub fn split_frames(builder: &FrameBuilder) -> Vec<String> {
    builder
        .objects
        .iter()
        .map(|object| format!("{},", object))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_format() {
        let frame = FrameBuilder::new().ready().token("x").build();
        assert!(frame.starts_with(r#"{"server":{"state":1}},{"agent":"#));
        assert!(frame.ends_with("},"));
        assert!(!frame.starts_with('['));

        let wrapped = format!("[{}]", frame.strip_suffix(',').unwrap());
        let parsed: Vec<Value> = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(parsed[1]["agent"]["state"], 3);
        assert_eq!(parsed[1]["agent"]["message"], "x");
    }

    #[test]
    fn test_split_frames() {
        let builder = FrameBuilder::new().start().token("a").finish("");
        let frames = split_frames(&builder);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.ends_with("},")));
    }
}
