use crate::error::ProtocolSequenceError;
use serde_json::Value;
use tryll_types::Turn;

/// Observable outcome of applying one server event or user action
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Server status 1
    ServerReady,
    ModelsAvailable(Vec<Value>),
    /// Server assigned an agent id for outbound requests
    AgentAssigned(u64),
    StreamStarted,
    /// One streamed token; `text` is the accumulated answer so far
    Token { token: String, text: String },
    /// A turn was appended to the conversation log at `index`
    TurnCompleted { index: usize, turn: Turn },
    /// An active stream was dropped without producing a turn
    StreamDiscarded,
    ProcessingChanged(bool),
    DataSource(String),
    /// Event ignored because it is out of sequence
    ProtocolViolation(ProtocolSequenceError),
}
