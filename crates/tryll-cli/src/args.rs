use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tryll")]
#[command(about = "Chat with a Tryll RAG backend from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (default: $TRYLL_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Chat API base URL; overrides the settings file and $TRYLL_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open an interactive chat session (type /help inside for commands)
    Chat,

    /// Fetch and print the server configuration
    Config,

    /// Fetch and print details of retrieved chunks
    Chunks {
        /// Chunk ids, as listed under an answer
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Replay a raw frame capture (one frame per line) through the session machine
    Decode {
        /// Capture file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Write the default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
