use serde::Serialize;
use serde_json::Value;
use tryll_types::{ChunkDetail, ConnectionStatus, ServerConfig, Turn};

/// Rendering events emitted by the widget controller.
///
/// The presentation layer is driven entirely by these; nothing is polled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WidgetEvent {
    StatusChanged(ConnectionStatus),
    /// Config fetch failed; the connect attempt ended without a retry
    ServerUnavailable { reason: String },
    /// Transport reported an error (a close usually follows)
    ConnectionError(String),

    UserTurn { index: usize, turn: Turn },
    StreamStarted,
    Token { token: String, text: String },
    TurnCompleted { index: usize, turn: Turn },
    StreamDiscarded,
    ProcessingChanged(bool),
    ModelsAvailable(Vec<Value>),
    DataSource(String),
    SendRejected { reason: String },

    ChunkDetails(Vec<ChunkDetail>),
    /// The latest answer carried no chunk ids; nothing was fetched
    ChunkDetailsEmpty,
    ChunkDetailsFailed(String),

    ConfigLoaded { config: ServerConfig, connected: bool },
    ConfigFailed(String),

    /// Quick feedback was queued; delivery is best-effort
    QuickFeedbackSent { turn_index: usize, positive: bool },
    FeedbackFormOpened,
    FeedbackRejected(String),
    FeedbackSubmitted,
    FeedbackFailed(String),
}
