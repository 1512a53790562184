pub mod chunk;
pub mod config;
pub mod connection;
pub mod turn;

pub use chunk::*;
pub use config::*;
pub use connection::*;
pub use turn::*;
