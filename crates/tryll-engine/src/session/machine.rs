use super::context::SessionContext;
use super::log::ConversationLog;
use super::stream::{StreamBuilder, parse_chunk_ids};
use super::update::SessionUpdate;
use crate::decoder::decode_frame;
use crate::error::{DecodeError, OutboundError, ProtocolSequenceError};
use crate::outbound;
use chrono::{DateTime, Utc};
use tryll_types::{
    AgentEvent, AgentState, FeedbackRecord, ServerConfig, ServerEvent, ServerState, Turn,
};

/// A user message accepted for sending
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Serialized chat request, ready for the transport
    pub frame: String,
    pub index: usize,
    pub turn: Turn,
}

/// Session/stream state machine.
///
/// Owns the conversation log, the single active stream and the processing
/// gate. Every transition is synchronous; callers supply the current time so
/// the machine stays deterministic under test.
#[derive(Debug, Default)]
pub struct SessionMachine {
    log: ConversationLog,
    active: Option<StreamBuilder>,
    context: Option<SessionContext>,
    processing: bool,
    ready: bool,
    agent_id: Option<u64>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn context(&self) -> Option<&SessionContext> {
        self.context.as_ref()
    }

    pub fn active_stream(&self) -> Option<&StreamBuilder> {
        self.active.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn agent_id(&self) -> Option<u64> {
        self.agent_id
    }

    /// Chunk ids of the most recent answer
    pub fn current_chunk_ids(&self) -> &[String] {
        self.log
            .last_assistant()
            .map(|(_, turn)| turn.rag_chunk_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Decode a raw frame and apply its events in frame order.
    /// A frame that fails to decode leaves the machine untouched.
    pub fn apply_frame(
        &mut self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionUpdate>, DecodeError> {
        let events = decode_frame(raw)?;
        Ok(events
            .iter()
            .flat_map(|event| self.apply(event, now))
            .collect())
    }

    pub fn apply(&mut self, event: &ServerEvent, now: DateTime<Utc>) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();

        match event {
            ServerEvent::ServerStatus(status) => match status.kind() {
                ServerState::Ready => {
                    self.ready = true;
                    updates.push(SessionUpdate::ServerReady);
                }
                ServerState::Busy => self.set_processing(true, &mut updates),
                ServerState::Other(_) => {}
            },
            ServerEvent::ModelsInfo(models) => {
                updates.push(SessionUpdate::ModelsAvailable(models.clone()));
            }
            ServerEvent::Agent(agent) => self.apply_agent(agent, now, &mut updates),
        }

        updates
    }

    fn apply_agent(
        &mut self,
        agent: &AgentEvent,
        now: DateTime<Utc>,
        updates: &mut Vec<SessionUpdate>,
    ) {
        if let Some(id) = agent.id
            && self.agent_id != Some(id)
        {
            self.agent_id = Some(id);
            updates.push(SessionUpdate::AgentAssigned(id));
        }

        match agent.kind() {
            AgentState::FullMessage => {
                // Independent of any active stream: never merged into it
                let turn = Turn::assistant(agent.text(), Vec::new(), now);
                self.complete_turn(turn, updates);
                self.set_processing(false, updates);
            }

            AgentState::StartStreaming => {
                if let Some(previous) = self.active.take() {
                    self.finalize(previous, Vec::new(), now, updates);
                }
                self.active = Some(StreamBuilder::new(now));
                updates.push(SessionUpdate::StreamStarted);
            }

            AgentState::Token => match self.active.as_mut() {
                Some(stream) => {
                    stream.push_token(agent.text());
                    updates.push(SessionUpdate::Token {
                        token: agent.text().to_string(),
                        text: stream.text().to_string(),
                    });
                }
                None => updates.push(SessionUpdate::ProtocolViolation(
                    ProtocolSequenceError::TokenWithoutStream {
                        token: agent.text().to_string(),
                    },
                )),
            },

            AgentState::FinishStreaming => {
                let rag_chunk_ids = parse_chunk_ids(agent.text());
                match self.active.take() {
                    Some(stream) => self.finalize(stream, rag_chunk_ids, now, updates),
                    None => updates.push(SessionUpdate::ProtocolViolation(
                        ProtocolSequenceError::FinishWithoutStream { rag_chunk_ids },
                    )),
                }
                self.set_processing(false, updates);
            }

            AgentState::DataSource => {
                updates.push(SessionUpdate::DataSource(agent.text().to_string()));
            }

            AgentState::Other(_) => {}
        }
    }

    fn finalize(
        &mut self,
        stream: StreamBuilder,
        rag_chunk_ids: Vec<String>,
        now: DateTime<Utc>,
        updates: &mut Vec<SessionUpdate>,
    ) {
        match stream.build(rag_chunk_ids, now) {
            Some(turn) => self.complete_turn(turn, updates),
            None => updates.push(SessionUpdate::StreamDiscarded),
        }
    }

    fn complete_turn(&mut self, turn: Turn, updates: &mut Vec<SessionUpdate>) {
        if let Some(context) = self.context.as_mut() {
            context.record_answer(&turn.text, &turn.rag_chunk_ids);
        }
        let index = self.log.push(turn.clone());
        updates.push(SessionUpdate::TurnCompleted { index, turn });
    }

    fn set_processing(&mut self, processing: bool, updates: &mut Vec<SessionUpdate>) {
        if self.processing != processing {
            self.processing = processing;
            updates.push(SessionUpdate::ProcessingChanged(processing));
        }
    }

    /// Accept a user message: validate, log it as a user turn, open the
    /// processing gate and return the serialized request.
    /// A refused message leaves the machine untouched.
    pub fn submit_user_message(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission, OutboundError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(OutboundError::EmptyMessage);
        }
        if !self.ready {
            return Err(OutboundError::NotReady);
        }
        if self.processing {
            return Err(OutboundError::Busy);
        }

        let frame = outbound::build_chat_request(self.agent_id, message)?;

        let turn = Turn::user(message, now);
        let index = self.log.push(turn.clone());
        self.context = Some(SessionContext::new(message, now));
        self.processing = true;

        Ok(Submission { frame, index, turn })
    }

    /// Reset per-connection state after the transport went away.
    /// The log and session context survive.
    pub fn connection_lost(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        self.ready = false;
        self.agent_id = None;
        if self.active.take().is_some() {
            updates.push(SessionUpdate::StreamDiscarded);
        }
        self.set_processing(false, &mut updates);
        updates
    }

    pub fn quick_feedback(
        &self,
        turn_index: usize,
        is_positive: bool,
        server_config: Option<&ServerConfig>,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord, OutboundError> {
        outbound::build_quick_feedback(
            &self.log,
            self.context.as_ref(),
            turn_index,
            is_positive,
            server_config,
            now,
        )
    }

    pub fn detailed_feedback(
        &self,
        text: &str,
        suggestion: &str,
        server_config: Option<&ServerConfig>,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord, OutboundError> {
        outbound::build_detailed_feedback(
            &self.log,
            self.context.as_ref(),
            text,
            suggestion,
            server_config,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryll_types::ServerStatus;

    fn agent(state: AgentState, message: &str) -> ServerEvent {
        ServerEvent::Agent(AgentEvent::new(state, message))
    }

    fn ready_machine() -> SessionMachine {
        let mut machine = SessionMachine::new();
        machine.apply(
            &ServerEvent::ServerStatus(ServerStatus { state: 1 }),
            Utc::now(),
        );
        machine
    }

    #[test]
    fn test_server_ready_sets_ready() {
        let machine = ready_machine();
        assert!(machine.is_ready());
        assert!(!machine.is_processing());
    }

    #[test]
    fn test_busy_status_opens_processing_gate() {
        let mut machine = ready_machine();
        let updates = machine.apply(
            &ServerEvent::ServerStatus(ServerStatus { state: 3 }),
            Utc::now(),
        );
        assert_eq!(updates, vec![SessionUpdate::ProcessingChanged(true)]);
        assert!(machine.is_processing());
    }

    #[test]
    fn test_unknown_server_state_is_ignored() {
        let mut machine = ready_machine();
        let updates = machine.apply(
            &ServerEvent::ServerStatus(ServerStatus { state: 9 }),
            Utc::now(),
        );
        assert!(updates.is_empty());
    }

    #[test]
    fn test_token_without_stream_is_violation() {
        let mut machine = ready_machine();
        let updates = machine.apply(&agent(AgentState::Token, "orphan"), Utc::now());

        assert_eq!(
            updates,
            vec![SessionUpdate::ProtocolViolation(
                ProtocolSequenceError::TokenWithoutStream {
                    token: "orphan".to_string()
                }
            )]
        );
        assert!(machine.log().is_empty());
    }

    #[test]
    fn test_finish_without_stream_clears_processing() {
        let mut machine = ready_machine();
        machine.submit_user_message("q", Utc::now()).unwrap();

        let updates = machine.apply(&agent(AgentState::FinishStreaming, "a;b"), Utc::now());
        assert!(matches!(
            updates[0],
            SessionUpdate::ProtocolViolation(ProtocolSequenceError::FinishWithoutStream { .. })
        ));
        assert!(!machine.is_processing());
    }

    #[test]
    fn test_data_source_is_informational() {
        let mut machine = ready_machine();
        let updates = machine.apply(&agent(AgentState::DataSource, "wiki"), Utc::now());
        assert_eq!(updates, vec![SessionUpdate::DataSource("wiki".to_string())]);
        assert!(machine.log().is_empty());
    }

    #[test]
    fn test_agent_id_is_captured_once() {
        let mut machine = ready_machine();
        let mut event = AgentEvent::new(AgentState::StartStreaming, "");
        event.id = Some(42);

        let updates = machine.apply(&ServerEvent::Agent(event.clone()), Utc::now());
        assert_eq!(updates[0], SessionUpdate::AgentAssigned(42));
        assert_eq!(machine.agent_id(), Some(42));

        let updates = machine.apply(&ServerEvent::Agent(event), Utc::now());
        assert!(!updates.contains(&SessionUpdate::AgentAssigned(42)));
    }

    #[test]
    fn test_submit_requires_ready() {
        let mut machine = SessionMachine::new();
        let err = machine.submit_user_message("hello", Utc::now()).unwrap_err();
        assert!(matches!(err, OutboundError::NotReady));
        assert!(machine.log().is_empty());
    }

    #[test]
    fn test_submit_rejects_blank_text() {
        let mut machine = ready_machine();
        let err = machine.submit_user_message("  \n\t", Utc::now()).unwrap_err();
        assert!(matches!(err, OutboundError::EmptyMessage));
        assert!(!machine.is_processing());
    }

    #[test]
    fn test_submit_trims_and_uses_agent_id() {
        let mut machine = ready_machine();
        let mut event = AgentEvent::new(AgentState::DataSource, "");
        event.id = Some(7);
        machine.apply(&ServerEvent::Agent(event), Utc::now());

        let submission = machine.submit_user_message("  hi there ", Utc::now()).unwrap();
        assert_eq!(
            submission.frame,
            r#"{"agent_message":{"id":7,"message":"hi there"}}"#
        );
        assert_eq!(submission.index, 0);
        assert_eq!(submission.turn.text, "hi there");
        assert!(machine.is_processing());
        assert_eq!(machine.context().unwrap().question, "hi there");
    }

    #[test]
    fn test_connection_lost_discards_active_stream() {
        let mut machine = ready_machine();
        machine.submit_user_message("q", Utc::now()).unwrap();
        machine.apply(&agent(AgentState::StartStreaming, ""), Utc::now());
        machine.apply(&agent(AgentState::Token, "partial"), Utc::now());

        let updates = machine.connection_lost();
        assert_eq!(
            updates,
            vec![
                SessionUpdate::StreamDiscarded,
                SessionUpdate::ProcessingChanged(false)
            ]
        );
        assert!(machine.active_stream().is_none());
        assert!(!machine.is_ready());
        assert_eq!(machine.log().len(), 1);
    }

    #[test]
    fn test_current_chunk_ids_follow_last_answer() {
        let mut machine = ready_machine();
        assert!(machine.current_chunk_ids().is_empty());

        machine.apply(&agent(AgentState::StartStreaming, ""), Utc::now());
        machine.apply(&agent(AgentState::Token, "x"), Utc::now());
        machine.apply(&agent(AgentState::FinishStreaming, "c1;c2"), Utc::now());
        assert_eq!(machine.current_chunk_ids(), ["c1", "c2"]);

        machine.apply(&agent(AgentState::FullMessage, "plain"), Utc::now());
        assert!(machine.current_chunk_ids().is_empty());
    }
}
