use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Most recent question and answer. A convenience cache overwritten on every
/// new turn; the conversation log stays authoritative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionContext {
    pub question: String,
    pub asked_at: DateTime<Utc>,
    pub answer: Option<String>,
    pub rag_chunk_ids: Vec<String>,
}

impl SessionContext {
    pub fn new(question: impl Into<String>, asked_at: DateTime<Utc>) -> Self {
        Self {
            question: question.into(),
            asked_at,
            answer: None,
            rag_chunk_ids: Vec::new(),
        }
    }

    /// Session identifier sent with feedback: the question's ISO-8601 time
    pub fn session_id(&self) -> String {
        iso_timestamp(self.asked_at)
    }

    pub fn record_answer(&mut self, answer: &str, rag_chunk_ids: &[String]) {
        self.answer = Some(answer.to_string());
        self.rag_chunk_ids = rag_chunk_ids.to_vec();
    }
}

/// `2026-01-02T03:04:05.678Z`
pub(crate) fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_id_is_iso_millis() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let context = SessionContext::new("q", at);
        assert_eq!(context.session_id(), "2026-03-04T05:06:07.000Z");
    }

    #[test]
    fn test_record_answer_overwrites() {
        let mut context = SessionContext::new("q", Utc::now());
        context.record_answer("a1", &["x".to_string()]);
        context.record_answer("a2", &[]);
        assert_eq!(context.answer.as_deref(), Some("a2"));
        assert!(context.rag_chunk_ids.is_empty());
    }
}
