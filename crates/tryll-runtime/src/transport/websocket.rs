use super::{Connection, Connector, TransportEvent};
use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::{FutureExt, SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// WebSocket transport over `tokio-tungstenite`
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Connector for WebSocketConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Connection>> {
        open(url.to_string(), self.connect_timeout).boxed()
    }
}

async fn open(url: String, connect_timeout: Duration) -> Result<Connection> {
    debug!(url = %url, "connecting to stream endpoint");

    let (ws_stream, _) =
        time::timeout(connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
            .await
            .map_err(|_| {
                Error::Transport(format!(
                    "connect timed out ({}s)",
                    connect_timeout.as_secs()
                ))
            })??;

    info!(url = %url, "stream transport open");

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(pump(ws_stream, event_tx, outbound_rx));

    Ok(Connection {
        events: event_rx,
        outbound: outbound_tx,
    })
}

/// Shuttle frames between the socket and the connection's channels until
/// either side goes away
async fn pump(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        warn!(error = %e, "stream write failed");
                        let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                        let _ = event_tx.send(TransportEvent::Closed { reason: None });
                        break;
                    }
                }
                None => {
                    debug!("outbound side dropped, closing stream");
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = event_tx.send(TransportEvent::Frame(text.to_string()));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => {
                        let _ = event_tx.send(TransportEvent::Frame(text));
                    }
                    Err(_) => warn!(len = bytes.len(), "dropping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|reason| !reason.is_empty());
                    debug!(reason = ?reason, "stream closed by server");
                    let _ = event_tx.send(TransportEvent::Closed { reason });
                    break;
                }
                // Ping/pong is answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "stream read failed");
                    let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                    let _ = event_tx.send(TransportEvent::Closed { reason: None });
                    break;
                }
                None => {
                    let _ = event_tx.send(TransportEvent::Closed { reason: None });
                    break;
                }
            },
        }
    }
}
