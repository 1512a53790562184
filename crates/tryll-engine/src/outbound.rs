use crate::error::OutboundError;
use crate::session::{ConversationLog, SessionContext, iso_timestamp};
use chrono::{DateTime, Utc};
use tryll_types::{AgentMessage, ChatRequest, FeedbackKind, FeedbackRecord, ServerConfig};

/// Serialize a chat request. Blank text is refused.
pub fn build_chat_request(agent_id: Option<u64>, text: &str) -> Result<String, OutboundError> {
    if text.trim().is_empty() {
        return Err(OutboundError::EmptyMessage);
    }

    let request = ChatRequest {
        agent_message: AgentMessage {
            id: agent_id.unwrap_or(0),
            message: text.to_string(),
        },
    };

    Ok(serde_json::to_string(&request)?)
}

fn session_id(context: Option<&SessionContext>, now: DateTime<Utc>) -> String {
    context
        .map(SessionContext::session_id)
        .unwrap_or_else(|| iso_timestamp(now))
}

/// Thumbs up/down for the assistant turn at `turn_index`.
/// The question is the user turn that preceded it in the log.
pub fn build_quick_feedback(
    log: &ConversationLog,
    context: Option<&SessionContext>,
    turn_index: usize,
    is_positive: bool,
    server_config: Option<&ServerConfig>,
    now: DateTime<Utc>,
) -> Result<FeedbackRecord, OutboundError> {
    let answer = log
        .get(turn_index)
        .filter(|turn| turn.is_assistant())
        .ok_or(OutboundError::UnknownTurn(turn_index))?;

    let question = log
        .question_for(turn_index)
        .map(|turn| turn.text.clone())
        .unwrap_or_default();

    Ok(FeedbackRecord {
        session_id: session_id(context, now),
        question,
        answer: answer.text.clone(),
        rag_chunk_ids: answer.rag_chunk_ids.clone(),
        is_positive,
        feedback_type: FeedbackKind::Quick,
        feedback_text: None,
        suggested_answer: None,
        server_config: server_config.cloned(),
    })
}

/// Free-text critique of the latest answer. Always negative; an empty
/// description is refused. With no answer yet, answer fields are blank.
pub fn build_detailed_feedback(
    log: &ConversationLog,
    context: Option<&SessionContext>,
    text: &str,
    suggestion: &str,
    server_config: Option<&ServerConfig>,
    now: DateTime<Utc>,
) -> Result<FeedbackRecord, OutboundError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(OutboundError::EmptyFeedback);
    }

    let last = log.last_assistant();
    let question = last
        .and_then(|(index, _)| log.question_for(index))
        .map(|turn| turn.text.clone())
        .or_else(|| context.map(|c| c.question.clone()))
        .unwrap_or_default();

    Ok(FeedbackRecord {
        session_id: session_id(context, now),
        question,
        answer: last.map(|(_, turn)| turn.text.clone()).unwrap_or_default(),
        rag_chunk_ids: last
            .map(|(_, turn)| turn.rag_chunk_ids.clone())
            .unwrap_or_default(),
        is_positive: false,
        feedback_type: FeedbackKind::Detailed,
        feedback_text: Some(text.to_string()),
        suggested_answer: Some(suggestion.trim().to_string()),
        server_config: server_config.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tryll_types::Turn;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, second).unwrap()
    }

    fn conversation() -> (ConversationLog, SessionContext) {
        let mut log = ConversationLog::new();
        log.push(Turn::user("What is mana?", at(0)));
        log.push(Turn::assistant(
            "Mana is magic energy.",
            vec!["c1".to_string(), "c2".to_string()],
            at(1),
        ));
        log.push(Turn::user("And stamina?", at(2)));
        log.push(Turn::assistant("Stamina limits sprinting.", Vec::new(), at(3)));

        let mut context = SessionContext::new("And stamina?", at(2));
        context.record_answer("Stamina limits sprinting.", &[]);
        (log, context)
    }

    #[test]
    fn test_chat_request_defaults_agent_id_to_zero() {
        let frame = build_chat_request(None, "hello").unwrap();
        assert_eq!(frame, r#"{"agent_message":{"id":0,"message":"hello"}}"#);
    }

    #[test]
    fn test_chat_request_rejects_whitespace() {
        assert!(matches!(
            build_chat_request(Some(3), "   "),
            Err(OutboundError::EmptyMessage)
        ));
    }

    #[test]
    fn test_quick_feedback_targets_specific_turn() {
        let (log, context) = conversation();
        let record =
            build_quick_feedback(&log, Some(&context), 1, true, None, at(9)).unwrap();

        assert_eq!(record.question, "What is mana?");
        assert_eq!(record.answer, "Mana is magic energy.");
        assert_eq!(record.rag_chunk_ids, vec!["c1", "c2"]);
        assert!(record.is_positive);
        assert_eq!(record.feedback_type, FeedbackKind::Quick);
        assert_eq!(record.session_id, "2026-01-02T03:04:02.000Z");
    }

    #[test]
    fn test_quick_feedback_rejects_user_turn() {
        let (log, context) = conversation();
        assert!(matches!(
            build_quick_feedback(&log, Some(&context), 0, false, None, at(9)),
            Err(OutboundError::UnknownTurn(0))
        ));
        assert!(matches!(
            build_quick_feedback(&log, Some(&context), 10, false, None, at(9)),
            Err(OutboundError::UnknownTurn(10))
        ));
    }

    #[test]
    fn test_session_id_falls_back_to_now() {
        let (log, _) = conversation();
        let record = build_quick_feedback(&log, None, 3, false, None, at(9)).unwrap();
        assert_eq!(record.session_id, "2026-01-02T03:04:09.000Z");
    }

    #[test]
    fn test_detailed_feedback_uses_last_answer() {
        let (log, context) = conversation();
        let config = ServerConfig {
            rag_chunks_number: Some(serde_json::json!(5)),
            ..ServerConfig::default()
        };

        let record = build_detailed_feedback(
            &log,
            Some(&context),
            " Too short ",
            "",
            Some(&config),
            at(9),
        )
        .unwrap();

        assert_eq!(record.question, "And stamina?");
        assert_eq!(record.answer, "Stamina limits sprinting.");
        assert!(!record.is_positive);
        assert_eq!(record.feedback_type, FeedbackKind::Detailed);
        assert_eq!(record.feedback_text.as_deref(), Some("Too short"));
        assert_eq!(record.suggested_answer.as_deref(), Some(""));
        assert_eq!(
            record.server_config.unwrap().rag_chunks_number,
            Some(serde_json::json!(5))
        );

        let json = serde_json::to_value(
            build_detailed_feedback(&log, Some(&context), "Too short", "", None, at(9)).unwrap(),
        )
        .unwrap();
        assert_eq!(json["suggested_answer"], "");
    }

    #[test]
    fn test_detailed_feedback_requires_text() {
        let (log, context) = conversation();
        assert!(matches!(
            build_detailed_feedback(&log, Some(&context), "  ", "better", None, at(9)),
            Err(OutboundError::EmptyFeedback)
        ));
    }

    #[test]
    fn test_detailed_feedback_without_answers() {
        let log = ConversationLog::new();
        let record = build_detailed_feedback(&log, None, "broken", "fix", None, at(9)).unwrap();
        assert_eq!(record.answer, "");
        assert!(record.rag_chunk_ids.is_empty());
        assert_eq!(record.suggested_answer.as_deref(), Some("fix"));
    }
}
