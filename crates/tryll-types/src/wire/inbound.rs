use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// NOTE: Inbound wire format
//
// The backend pushes frames that are NOT valid JSON on their own: every object is
// followed by a comma and there is no enclosing array, e.g.
//
//   {"server":{"state":1}},{"agent":{"state":2,"message":""}},
//
// Each object carries exactly one meaningful top-level key (`server`, `models`
// or `agent`). Unknown keys are ignored so newer servers keep working.

/// Body of a `{"server": {...}}` object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub state: i64,
}

impl ServerStatus {
    pub fn kind(&self) -> ServerState {
        ServerState::from_code(self.state)
    }
}

/// Server lifecycle codes the client reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// 1: server is ready to accept messages
    Ready,
    /// 3: server is busy producing an answer
    Busy,
    /// Any other server-defined code (ignored by the client)
    Other(i64),
}

impl ServerState {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ServerState::Ready,
            3 => ServerState::Busy,
            other => ServerState::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ServerState::Ready => 1,
            ServerState::Busy => 3,
            ServerState::Other(code) => code,
        }
    }
}

/// Body of an `{"agent": {...}}` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub state: i64,

    /// Token text, full answer, `;`-joined chunk ids or a data source note,
    /// depending on `state`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Agent/session id assigned by the server, when it reports a numeric one
    #[serde(
        default,
        deserialize_with = "numeric_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
}

/// Any non-numeric id (string, null, negative) reads as absent
fn numeric_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_u64))
}

impl AgentEvent {
    pub fn new(state: AgentState, message: impl Into<String>) -> Self {
        Self {
            state: state.code(),
            message: Some(message.into()),
            id: None,
        }
    }

    pub fn kind(&self) -> AgentState {
        AgentState::from_code(self.state)
    }

    /// Payload text, empty when the server omitted it
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Agent event codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// 1: complete answer delivered in one piece
    FullMessage,
    /// 2: a streamed answer begins
    StartStreaming,
    /// 3: one streamed token
    Token,
    /// 4: streamed answer ends; payload carries chunk ids
    FinishStreaming,
    /// 8: data source diagnostics
    DataSource,
    Other(i64),
}

impl AgentState {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AgentState::FullMessage,
            2 => AgentState::StartStreaming,
            3 => AgentState::Token,
            4 => AgentState::FinishStreaming,
            8 => AgentState::DataSource,
            other => AgentState::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            AgentState::FullMessage => 1,
            AgentState::StartStreaming => 2,
            AgentState::Token => 3,
            AgentState::FinishStreaming => 4,
            AgentState::DataSource => 8,
            AgentState::Other(code) => code,
        }
    }
}

/// One decoded object of an inbound frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    ServerStatus(ServerStatus),
    ModelsInfo(Vec<Value>),
    Agent(AgentEvent),
}

impl ServerEvent {
    /// Classify one decoded frame object by its top-level key.
    ///
    /// Precedence is `server`, then `models`, then `agent`. Returns `Ok(None)`
    /// for objects (or non-objects) that carry none of them.
    pub fn classify(value: &Value) -> Result<Option<ServerEvent>> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };

        if let Some(body) = object.get("server") {
            let status = ServerStatus::deserialize(body)
                .map_err(|e| Error::Shape(format!("server: {}", e)))?;
            return Ok(Some(ServerEvent::ServerStatus(status)));
        }

        if let Some(body) = object.get("models") {
            let models = match body {
                Value::Array(items) => items.clone(),
                Value::Null => Vec::new(),
                other => vec![other.clone()],
            };
            return Ok(Some(ServerEvent::ModelsInfo(models)));
        }

        if let Some(body) = object.get("agent") {
            let agent = AgentEvent::deserialize(body)
                .map_err(|e| Error::Shape(format!("agent: {}", e)))?;
            return Ok(Some(ServerEvent::Agent(agent)));
        }

        Ok(None)
    }
}
