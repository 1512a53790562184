//! Widget controller.
//!
//! A single task owns the session machine and every piece of connection
//! state. User commands, transport events, retry timers and completions of
//! spawned network calls all arrive on channels and are applied one at a
//! time, so a transition never suspends halfway.

use crate::api::{ChatApi, HttpChatApi};
use crate::config::ClientSettings;
use crate::endpoint::stream_url;
use crate::events::WidgetEvent;
use crate::reconnect::{ReconnectPolicy, ReconnectState};
use crate::transport::{Connection, Connector, TransportEvent, WebSocketConnector};
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tryll_engine::{SessionMachine, SessionUpdate};
use tryll_types::{ChunkDetail, ConnectionStatus, ServerConfig};

#[derive(Debug)]
enum Command {
    Open,
    Close,
    Send(String),
    ShowChunkDetails,
    QuickFeedback { turn_index: usize, positive: bool },
    OpenFeedbackForm,
    DetailedFeedback { text: String, suggestion: String },
    ShowConfig,
}

/// Outcome of one connect attempt, tagged with the attempt's epoch
enum AttemptOutcome {
    Unavailable(Error),
    Failed { config: ServerConfig, error: Error },
    Opened { config: ServerConfig, connection: Connection },
}

enum Completion {
    Attempt { epoch: u64, outcome: AttemptOutcome },
    RetryDue { epoch: u64 },
    Chunks(Result<Vec<ChunkDetail>>),
    Config(Result<ServerConfig>),
    QuickFeedback(Result<()>),
    DetailedFeedback(Result<()>),
}

enum Step {
    Command(Command),
    Transport(Option<TransportEvent>),
    Completion(Completion),
    Shutdown,
}

/// Cloneable handle to a running widget controller.
///
/// Every method only queues a command; results arrive as [`WidgetEvent`]s.
/// The controller stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl WidgetHandle {
    fn dispatch(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("widget controller already stopped");
        }
    }

    /// Show the widget; connects if there is no live transport
    pub fn open(&self) {
        self.dispatch(Command::Open);
    }

    /// Hide the widget. The transport stays up but is not retried once lost.
    pub fn close(&self) {
        self.dispatch(Command::Close);
    }

    pub fn send(&self, text: impl Into<String>) {
        self.dispatch(Command::Send(text.into()));
    }

    /// Fetch details of the chunks behind the latest answer
    pub fn show_chunk_details(&self) {
        self.dispatch(Command::ShowChunkDetails);
    }

    pub fn submit_quick_feedback(&self, turn_index: usize, positive: bool) {
        self.dispatch(Command::QuickFeedback {
            turn_index,
            positive,
        });
    }

    pub fn open_feedback_form(&self) {
        self.dispatch(Command::OpenFeedbackForm);
    }

    pub fn submit_detailed_feedback(&self, text: impl Into<String>, suggestion: impl Into<String>) {
        self.dispatch(Command::DetailedFeedback {
            text: text.into(),
            suggestion: suggestion.into(),
        });
    }

    pub fn show_config(&self) {
        self.dispatch(Command::ShowConfig);
    }
}

pub struct ChatWidget;

impl ChatWidget {
    /// Spawn a controller on the current tokio runtime
    pub fn spawn(
        settings: &ClientSettings,
        connector: Arc<dyn Connector>,
        api: Arc<dyn ChatApi>,
    ) -> (WidgetHandle, mpsc::UnboundedReceiver<WidgetEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let controller = Controller {
            base_url: settings.base_url.clone(),
            proxy_ws_path: settings.proxy_ws_path.clone(),
            policy: ReconnectPolicy::from(&settings.reconnect),
            connector,
            api,
            machine: SessionMachine::new(),
            status: ConnectionStatus::Disconnected,
            is_open: false,
            connection: None,
            connecting: false,
            epoch: 0,
            reconnect: ReconnectState::new(),
            server_config: None,
            events: event_tx,
            commands: command_rx,
            completion_tx,
            completion_rx,
        };
        tokio::spawn(controller.run());

        (
            WidgetHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    /// Spawn a controller wired to the real HTTP API and WebSocket transport
    pub fn spawn_default(
        settings: &ClientSettings,
    ) -> Result<(WidgetHandle, mpsc::UnboundedReceiver<WidgetEvent>)> {
        let api = HttpChatApi::new(settings.base_url.clone(), settings.request_timeout())?;
        let connector = WebSocketConnector::new(settings.connect_timeout());
        Ok(Self::spawn(settings, Arc::new(connector), Arc::new(api)))
    }
}

struct Controller {
    base_url: String,
    proxy_ws_path: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    api: Arc<dyn ChatApi>,

    machine: SessionMachine,
    status: ConnectionStatus,
    is_open: bool,
    connection: Option<Connection>,
    /// A connect attempt is in flight
    connecting: bool,
    /// Bumped per attempt; completions from older attempts are stale
    epoch: u64,
    reconnect: ReconnectState,
    /// Snapshot echoed back in feedback records
    server_config: Option<ServerConfig>,

    events: mpsc::UnboundedSender<WidgetEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

async fn next_transport_event(connection: &mut Option<Connection>) -> Option<TransportEvent> {
    match connection {
        Some(conn) => conn.events.recv().await,
        None => std::future::pending().await,
    }
}

impl Controller {
    async fn run(mut self) {
        loop {
            let step = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => Step::Command(command),
                    None => Step::Shutdown,
                },
                event = next_transport_event(&mut self.connection) => Step::Transport(event),
                Some(completion) = self.completion_rx.recv() => Step::Completion(completion),
            };

            match step {
                Step::Command(command) => self.handle_command(command),
                Step::Transport(Some(event)) => self.handle_transport(event),
                Step::Transport(None) => self.connection_lost(None),
                Step::Completion(completion) => self.handle_completion(completion),
                Step::Shutdown => break,
            }
        }
        debug!("widget controller stopped");
    }

    fn emit(&self, event: WidgetEvent) {
        let _ = self.events.send(event);
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "connection status changed");
            self.status = status;
            self.emit(WidgetEvent::StatusChanged(status));
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open => {
                self.is_open = true;
                if self.connection.is_none() && !self.connecting {
                    self.reconnect.reset();
                    self.start_attempt();
                }
            }
            Command::Close => {
                self.is_open = false;
            }
            Command::Send(text) => self.send(&text),
            Command::ShowChunkDetails => self.show_chunk_details(),
            Command::QuickFeedback {
                turn_index,
                positive,
            } => self.quick_feedback(turn_index, positive),
            Command::OpenFeedbackForm => self.emit(WidgetEvent::FeedbackFormOpened),
            Command::DetailedFeedback { text, suggestion } => {
                self.detailed_feedback(&text, &suggestion)
            }
            Command::ShowConfig => {
                let fetch = self.api.fetch_config();
                self.spawn_completion(async move { Completion::Config(fetch.await) });
            }
        }
    }

    fn spawn_completion<F>(&self, future: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(future.await);
        });
    }

    /// Fetch config, resolve the stream URL and open the transport
    fn start_attempt(&mut self) {
        self.epoch += 1;
        self.connecting = true;
        self.set_status(ConnectionStatus::Connecting);

        let epoch = self.epoch;
        let api = Arc::clone(&self.api);
        let connector = Arc::clone(&self.connector);
        let base_url = self.base_url.clone();
        let proxy_ws_path = self.proxy_ws_path.clone();

        info!(epoch, attempt = self.reconnect.attempts(), "connecting");

        self.spawn_completion(async move {
            let config = match api.fetch_config().await {
                Ok(config) => config,
                Err(error) => {
                    return Completion::Attempt {
                        epoch,
                        outcome: AttemptOutcome::Unavailable(error),
                    };
                }
            };

            let url = match stream_url(&base_url, &proxy_ws_path, &config) {
                Ok(url) => url,
                Err(error) => {
                    return Completion::Attempt {
                        epoch,
                        outcome: AttemptOutcome::Unavailable(error),
                    };
                }
            };

            let outcome = match connector.connect(&url).await {
                Ok(connection) => AttemptOutcome::Opened { config, connection },
                Err(error) => AttemptOutcome::Failed { config, error },
            };
            Completion::Attempt { epoch, outcome }
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Attempt { epoch, outcome } => {
                if epoch != self.epoch {
                    debug!(epoch, current = self.epoch, "dropping stale connect attempt");
                    return;
                }
                self.connecting = false;
                match outcome {
                    AttemptOutcome::Unavailable(error) => {
                        warn!(error = %error, "server unavailable");
                        self.set_status(ConnectionStatus::Disconnected);
                        self.emit(WidgetEvent::ServerUnavailable {
                            reason: error.to_string(),
                        });
                    }
                    AttemptOutcome::Failed { config, error } => {
                        warn!(error = %error, "failed to open stream transport");
                        self.server_config = Some(config);
                        self.connection_lost(Some(error.to_string()));
                    }
                    AttemptOutcome::Opened { config, connection } => {
                        info!("stream transport open, waiting for server ready");
                        self.server_config = Some(config);
                        self.connection = Some(connection);
                        self.reconnect.reset();
                    }
                }
            }
            Completion::RetryDue { epoch } => {
                if epoch != self.epoch || self.connection.is_some() || self.connecting {
                    return;
                }
                if self.is_open {
                    self.start_attempt();
                } else {
                    self.set_status(ConnectionStatus::Disconnected);
                }
            }
            Completion::Chunks(result) => match result {
                Ok(chunks) => self.emit(WidgetEvent::ChunkDetails(chunks)),
                Err(error) => {
                    warn!(error = %error, "chunk details request failed");
                    self.emit(WidgetEvent::ChunkDetailsFailed(error.to_string()));
                }
            },
            Completion::Config(result) => match result {
                Ok(config) => {
                    self.server_config = Some(config.clone());
                    self.emit(WidgetEvent::ConfigLoaded {
                        config,
                        connected: self.status.is_connected(),
                    });
                }
                Err(error) => {
                    warn!(error = %error, "config request failed");
                    self.emit(WidgetEvent::ConfigFailed(error.to_string()));
                }
            },
            Completion::QuickFeedback(result) => {
                if let Err(error) = result {
                    warn!(error = %error, "quick feedback was not delivered");
                }
            }
            Completion::DetailedFeedback(result) => match result {
                Ok(()) => self.emit(WidgetEvent::FeedbackSubmitted),
                Err(error) => {
                    warn!(error = %error, "detailed feedback was not delivered");
                    self.emit(WidgetEvent::FeedbackFailed(error.to_string()));
                }
            },
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(raw) => match self.machine.apply_frame(&raw, Utc::now()) {
                Ok(updates) => {
                    for update in updates {
                        self.forward(update);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "dropping malformed frame");
                }
            },
            TransportEvent::Error(message) => {
                warn!(error = %message, "transport error");
                self.emit(WidgetEvent::ConnectionError(message));
            }
            TransportEvent::Closed { reason } => self.connection_lost(reason),
        }
    }

    /// Involuntary close: reset per-connection state and apply the retry policy
    fn connection_lost(&mut self, reason: Option<String>) {
        info!(reason = ?reason, "stream transport closed");
        self.connection = None;

        for update in self.machine.connection_lost() {
            self.forward(update);
        }

        match self.reconnect.next_delay(&self.policy, self.is_open) {
            Some(delay) => {
                self.set_status(ConnectionStatus::Reconnecting);
                self.schedule_retry(delay);
            }
            None => {
                if self.is_open {
                    warn!(
                        attempts = self.reconnect.attempts(),
                        "max reconnection attempts reached, giving up"
                    );
                }
                self.set_status(ConnectionStatus::Disconnected);
            }
        }
    }

    fn schedule_retry(&self, delay: Duration) {
        let epoch = self.epoch;
        debug!(epoch, delay_ms = delay.as_millis() as u64, "scheduling reconnect");
        self.spawn_completion(async move {
            tokio::time::sleep(delay).await;
            Completion::RetryDue { epoch }
        });
    }

    fn forward(&mut self, update: SessionUpdate) {
        let event = match update {
            SessionUpdate::ServerReady => {
                self.set_status(ConnectionStatus::Connected);
                return;
            }
            SessionUpdate::AgentAssigned(id) => {
                debug!(agent_id = id, "agent assigned");
                return;
            }
            SessionUpdate::ProtocolViolation(err) => {
                warn!(error = %err, "ignoring out-of-sequence event");
                return;
            }
            SessionUpdate::ModelsAvailable(models) => WidgetEvent::ModelsAvailable(models),
            SessionUpdate::StreamStarted => WidgetEvent::StreamStarted,
            SessionUpdate::Token { token, text } => WidgetEvent::Token { token, text },
            SessionUpdate::TurnCompleted { index, turn } => {
                WidgetEvent::TurnCompleted { index, turn }
            }
            SessionUpdate::StreamDiscarded => WidgetEvent::StreamDiscarded,
            SessionUpdate::ProcessingChanged(processing) => {
                WidgetEvent::ProcessingChanged(processing)
            }
            SessionUpdate::DataSource(text) => WidgetEvent::DataSource(text),
        };
        self.emit(event);
    }

    fn send(&mut self, text: &str) {
        let Some(connection) = self.connection.as_ref() else {
            self.emit(WidgetEvent::SendRejected {
                reason: tryll_engine::OutboundError::NotReady.to_string(),
            });
            return;
        };

        match self.machine.submit_user_message(text, Utc::now()) {
            Ok(submission) => {
                if !connection.send(submission.frame) {
                    warn!("transport gone before the message could be queued");
                }
                self.emit(WidgetEvent::UserTurn {
                    index: submission.index,
                    turn: submission.turn,
                });
                self.emit(WidgetEvent::ProcessingChanged(true));
            }
            Err(err) => {
                debug!(error = %err, "message rejected");
                self.emit(WidgetEvent::SendRejected {
                    reason: err.to_string(),
                });
            }
        }
    }

    fn show_chunk_details(&mut self) {
        let ids = self.machine.current_chunk_ids().to_vec();
        if ids.is_empty() {
            self.emit(WidgetEvent::ChunkDetailsEmpty);
            return;
        }
        let fetch = self.api.fetch_chunks(ids);
        self.spawn_completion(async move { Completion::Chunks(fetch.await) });
    }

    fn quick_feedback(&mut self, turn_index: usize, positive: bool) {
        let record = match self.machine.quick_feedback(
            turn_index,
            positive,
            self.server_config.as_ref(),
            Utc::now(),
        ) {
            Ok(record) => record,
            Err(err) => {
                self.emit(WidgetEvent::FeedbackRejected(err.to_string()));
                return;
            }
        };

        let post = self.api.submit_feedback(record);
        self.emit(WidgetEvent::QuickFeedbackSent {
            turn_index,
            positive,
        });
        self.spawn_completion(async move { Completion::QuickFeedback(post.await) });
    }

    fn detailed_feedback(&mut self, text: &str, suggestion: &str) {
        let record = match self.machine.detailed_feedback(
            text,
            suggestion,
            self.server_config.as_ref(),
            Utc::now(),
        ) {
            Ok(record) => record,
            Err(err) => {
                self.emit(WidgetEvent::FeedbackRejected(err.to_string()));
                return;
            }
        };

        let post = self.api.submit_feedback(record);
        self.spawn_completion(async move { Completion::DetailedFeedback(post.await) });
    }
}
