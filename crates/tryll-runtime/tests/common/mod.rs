#![allow(dead_code)]

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tryll_runtime::{
    ChatApi, ChatWidget, ClientSettings, Connection, Connector, Error, Result, TransportEvent,
    WidgetEvent, WidgetHandle,
};
use tryll_testing::FrameBuilder;
use tryll_types::{ChunkDetail, ConnectionStatus, FeedbackRecord, ServerConfig};

/// In-memory chat API
pub struct FakeApi {
    config: Option<Value>,
    chunks: Value,
    fail_feedback: AtomicBool,
    chunk_requests: Mutex<Vec<Vec<String>>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
}

impl FakeApi {
    pub fn with_config(config: Value) -> Arc<Self> {
        Arc::new(Self {
            config: Some(config),
            chunks: tryll_testing::fixtures::chunks(&["c1", "c2"]),
            fail_feedback: AtomicBool::new(false),
            chunk_requests: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
        })
    }

    /// Every config fetch fails
    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            config: None,
            chunks: Value::Array(Vec::new()),
            fail_feedback: AtomicBool::new(false),
            chunk_requests: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_feedback(&self) {
        self.fail_feedback.store(true, Ordering::SeqCst);
    }

    pub fn chunk_requests(&self) -> Vec<Vec<String>> {
        self.chunk_requests.lock().unwrap().clone()
    }

    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.lock().unwrap().clone()
    }
}

impl ChatApi for FakeApi {
    fn fetch_config(&self) -> BoxFuture<'static, Result<ServerConfig>> {
        let result = match &self.config {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::Request(e.to_string())),
            None => Err(Error::Request("connection refused".to_string())),
        };
        futures::future::ready(result).boxed()
    }

    fn fetch_chunks(&self, ids: Vec<String>) -> BoxFuture<'static, Result<Vec<ChunkDetail>>> {
        self.chunk_requests.lock().unwrap().push(ids);
        let result = serde_json::from_value(self.chunks.clone())
            .map_err(|e| Error::Request(e.to_string()));
        futures::future::ready(result).boxed()
    }

    fn submit_feedback(&self, record: FeedbackRecord) -> BoxFuture<'static, Result<()>> {
        self.feedback.lock().unwrap().push(record);
        let result = if self.fail_feedback.load(Ordering::SeqCst) {
            Err(Error::Request("POST /feedback failed (500)".to_string()))
        } else {
            Ok(())
        };
        futures::future::ready(result).boxed()
    }
}

/// Server side of one fake transport
pub struct ServerEnd {
    pub events: mpsc::UnboundedSender<TransportEvent>,
    pub outbound: mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    pub fn push(&self, frame: &FrameBuilder) {
        self.push_raw(&frame.build());
    }

    pub fn push_raw(&self, raw: &str) {
        self.events
            .send(TransportEvent::Frame(raw.to_string()))
            .expect("controller dropped the connection");
    }

    pub fn close(&self) {
        let _ = self.events.send(TransportEvent::Closed { reason: None });
    }

    /// Next outbound frame, parsed
    pub async fn next_outbound(&mut self) -> Value {
        let raw = tokio::time::timeout(Duration::from_secs(5), self.outbound.recv())
            .await
            .expect("timed out waiting for an outbound frame")
            .expect("outbound channel closed");
        serde_json::from_str(&raw).expect("outbound frame is JSON")
    }
}

/// Connector handing out in-memory transports
pub struct FakeConnector {
    fail: bool,
    urls: Mutex<Vec<String>>,
    servers: mpsc::UnboundedSender<ServerEnd>,
}

impl FakeConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                fail: false,
                urls: Mutex::new(Vec::new()),
                servers: tx,
            }),
            rx,
        )
    }

    /// Every connect attempt fails to open
    pub fn failing() -> Arc<Self> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            fail: true,
            urls: Mutex::new(Vec::new()),
            servers: tx,
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Connection>> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return futures::future::ready(Err(Error::Transport(
                "connection refused".to_string(),
            )))
            .boxed();
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let _ = self.servers.send(ServerEnd {
            events: event_tx,
            outbound: outbound_rx,
        });
        futures::future::ready(Ok(Connection {
            events: event_rx,
            outbound: outbound_tx,
        }))
        .boxed()
    }
}

pub fn settings() -> ClientSettings {
    ClientSettings::default()
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<WidgetEvent>) -> WidgetEvent {
    tokio::time::timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("timed out waiting for a widget event")
        .expect("widget event channel closed")
}

/// Skip events until one matches
pub async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<WidgetEvent>,
    mut matches: impl FnMut(&WidgetEvent) -> bool,
) -> WidgetEvent {
    loop {
        let event = next_event(events).await;
        if matches(&event) {
            return event;
        }
    }
}

pub async fn wait_for_status(
    events: &mut mpsc::UnboundedReceiver<WidgetEvent>,
    status: ConnectionStatus,
) {
    wait_for(events, |event| *event == WidgetEvent::StatusChanged(status)).await;
}

pub struct Harness {
    pub widget: WidgetHandle,
    pub events: mpsc::UnboundedReceiver<WidgetEvent>,
    pub servers: mpsc::UnboundedReceiver<ServerEnd>,
    pub connector: Arc<FakeConnector>,
    pub api: Arc<FakeApi>,
}

impl Harness {
    pub fn start(api: Arc<FakeApi>, settings: &ClientSettings) -> Self {
        let (connector, servers) = FakeConnector::new();
        let (widget, events) = ChatWidget::spawn(settings, connector.clone(), api.clone());
        Self {
            widget,
            events,
            servers,
            connector,
            api,
        }
    }

    /// Open the widget and wait for the next transport to report ready.
    /// The transport closes once the returned end is dropped.
    #[must_use = "dropping the server end closes the transport"]
    pub async fn connect_ready(&mut self) -> ServerEnd {
        self.widget.open();
        let server = self.next_server().await;
        server.push(&FrameBuilder::new().ready());
        wait_for_status(&mut self.events, ConnectionStatus::Connected).await;
        server
    }

    pub async fn next_server(&mut self) -> ServerEnd {
        tokio::time::timeout(Duration::from_secs(60), self.servers.recv())
            .await
            .expect("timed out waiting for a connect attempt")
            .expect("connector dropped")
    }
}
