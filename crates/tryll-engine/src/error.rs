use std::fmt;

/// Result type for tryll-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// Inbound frame could not be decoded
    Decode(DecodeError),

    /// Inbound events arrived in an order the protocol does not allow
    Protocol(ProtocolSequenceError),

    /// Outbound message could not be built or was refused
    Outbound(OutboundError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "{}", err),
            Error::Protocol(err) => write!(f, "{}", err),
            Error::Outbound(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::Protocol(err) => Some(err),
            Error::Outbound(err) => Some(err),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<ProtocolSequenceError> for Error {
    fn from(err: ProtocolSequenceError) -> Self {
        Error::Protocol(err)
    }
}

impl From<OutboundError> for Error {
    fn from(err: OutboundError) -> Self {
        Error::Outbound(err)
    }
}

const PREVIEW_CHARS: usize = 120;

/// A frame that is not a comma-terminated sequence of JSON objects.
/// The frame is dropped as a whole; the connection stays alive.
#[derive(Debug)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// Leading part of the offending frame, for logs
    pub preview: String,
}

#[derive(Debug)]
pub enum DecodeErrorKind {
    /// Not valid JSON once wrapped in brackets
    Syntax(serde_json::Error),
}

impl DecodeError {
    pub(crate) fn syntax(frame: &str, err: serde_json::Error) -> Self {
        Self {
            kind: DecodeErrorKind::Syntax(err),
            preview: preview(frame),
        }
    }
}

fn preview(frame: &str) -> String {
    let mut chars = frame.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DecodeErrorKind::Syntax(err) => {
                write!(f, "Malformed frame ({}): {}", err, self.preview)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            DecodeErrorKind::Syntax(err) => Some(err),
        }
    }
}

/// Inbound event that makes no sense in the current stream state.
/// Logged and ignored; never closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolSequenceError {
    /// Token (agent code 3) while no stream is active
    TokenWithoutStream { token: String },
    /// Finish (agent code 4) while no stream is active
    FinishWithoutStream { rag_chunk_ids: Vec<String> },
}

impl fmt::Display for ProtocolSequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolSequenceError::TokenWithoutStream { token } => {
                write!(f, "Token received with no active stream: {:?}", token)
            }
            ProtocolSequenceError::FinishWithoutStream { rag_chunk_ids } => write!(
                f,
                "Finish received with no active stream ({} chunk ids)",
                rag_chunk_ids.len()
            ),
        }
    }
}

impl std::error::Error for ProtocolSequenceError {}

/// Outbound message refused before anything is sent
#[derive(Debug)]
pub enum OutboundError {
    /// User text is empty or whitespace only
    EmptyMessage,
    /// An answer is still being produced
    Busy,
    /// The server has not confirmed readiness
    NotReady,
    /// Detailed feedback without a description
    EmptyFeedback,
    /// Feedback targets a turn that is not an assistant answer
    UnknownTurn(usize),
    /// Serialization failed
    Json(serde_json::Error),
}

impl fmt::Display for OutboundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundError::EmptyMessage => write!(f, "Message is empty"),
            OutboundError::Busy => write!(f, "Still processing the previous message"),
            OutboundError::NotReady => write!(f, "Not connected"),
            OutboundError::EmptyFeedback => write!(f, "Please describe what could be improved"),
            OutboundError::UnknownTurn(index) => {
                write!(f, "No assistant answer at position {}", index)
            }
            OutboundError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for OutboundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutboundError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OutboundError {
    fn from(err: serde_json::Error) -> Self {
        OutboundError::Json(err)
    }
}
