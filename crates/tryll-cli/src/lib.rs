// tryll: terminal front-end for the chat widget controller.
//
// Handlers own IO (stdin, stdout, the tokio runtime); presentation views are
// plain Display impls; the runtime crate does all networking.

mod args;
mod commands;
mod handlers;
pub mod input;
pub mod logging;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
