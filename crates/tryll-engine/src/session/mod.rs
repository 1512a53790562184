mod context;
mod log;
mod machine;
mod stream;
mod update;

pub use context::SessionContext;
pub(crate) use context::iso_timestamp;
pub use log::ConversationLog;
pub use machine::{SessionMachine, Submission};
pub use stream::{StreamBuilder, parse_chunk_ids};
pub use update::SessionUpdate;
