//! Stream transport seam.
//!
//! The widget controller never touches a socket directly: it asks a
//! [`Connector`] for a [`Connection`] and then only sees [`TransportEvent`]s
//! on a channel. Tests substitute a connector that hands out in-memory
//! channels.

mod websocket;

pub use websocket::WebSocketConnector;

use crate::Result;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

/// Something that happened on an open transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One raw inbound frame
    Frame(String),
    /// Transport-level error; a `Closed` follows when the transport gives up
    Error(String),
    /// The transport closed. Always the last event of a connection.
    Closed { reason: Option<String> },
}

/// An open transport.
///
/// Dropping `outbound` asks the transport to close; dropping `events` stops
/// delivery. A receiver that yields `None` means the transport is gone.
#[derive(Debug)]
pub struct Connection {
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub outbound: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// Queue one outbound frame. Returns false when the transport is gone.
    pub fn send(&self, frame: String) -> bool {
        self.outbound.send(frame).is_ok()
    }
}

/// Opens stream transports. Resolves once the transport is open.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Connection>>;
}
