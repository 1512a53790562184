// Engine module - protocol interpretation for the chat client
// This layer sits between raw transport frames and the controller/presentation.
// It performs no IO: callers feed frames and user actions, and read back updates.

pub mod decoder;
pub mod error;
pub mod outbound;
pub mod session;

pub use decoder::decode_frame;
pub use error::{
    DecodeError, DecodeErrorKind, Error, OutboundError, ProtocolSequenceError, Result,
};
pub use outbound::{build_chat_request, build_detailed_feedback, build_quick_feedback};
pub use session::{
    ConversationLog, SessionContext, SessionMachine, SessionUpdate, StreamBuilder, Submission,
    parse_chunk_ids,
};
