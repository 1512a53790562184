pub mod chat;
pub mod chunks;
pub mod config;
pub mod decode;
pub mod init;
