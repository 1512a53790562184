//! Terminal rendering.
//!
//! Views are borrowed wrappers implementing `fmt::Display`; handlers pick
//! between a view and `serde_json` output based on `--format`. The chat
//! transcript is the one stateful renderer, since streamed tokens are
//! written before their turn is complete.

pub mod chat;
pub mod chunks;
pub mod config;
pub mod decode;
pub mod init;
pub mod text;

pub use chat::ChatTranscript;
pub use chunks::ChunkListView;
pub use config::ConfigView;
pub use decode::{DecodeReport, DecodeReportView, FrameOutcome};
pub use init::{InitOutcome, InitView};
