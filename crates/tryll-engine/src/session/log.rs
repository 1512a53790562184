use serde::Serialize;
use tryll_types::{Role, Turn};

/// Append-only, insertion-ordered record of finalized turns.
/// The authoritative source for feedback reconstruction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its position in the log
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_assistant(&self) -> Option<(usize, &Turn)> {
        self.turns
            .iter()
            .enumerate()
            .rev()
            .find(|(_, turn)| turn.role == Role::Assistant)
    }

    /// The user turn that prompted the turn at `index`: the nearest user turn
    /// before it
    pub fn question_for(&self, index: usize) -> Option<&Turn> {
        self.turns
            .get(..index.min(self.turns.len()))?
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_log() -> ConversationLog {
        let now = Utc::now();
        let mut log = ConversationLog::new();
        log.push(Turn::user("first?", now));
        log.push(Turn::assistant("one", vec!["c1".to_string()], now));
        log.push(Turn::user("second?", now));
        log.push(Turn::assistant("two", Vec::new(), now));
        log
    }

    #[test]
    fn test_push_returns_index() {
        let mut log = ConversationLog::new();
        assert_eq!(log.push(Turn::user("hi", Utc::now())), 0);
        assert_eq!(log.push(Turn::user("again", Utc::now())), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_last_assistant() {
        let log = sample_log();
        let (index, turn) = log.last_assistant().unwrap();
        assert_eq!(index, 3);
        assert_eq!(turn.text, "two");

        assert!(ConversationLog::new().last_assistant().is_none());
    }

    #[test]
    fn test_question_for_uses_preceding_user_turn() {
        let log = sample_log();
        assert_eq!(log.question_for(1).unwrap().text, "first?");
        assert_eq!(log.question_for(3).unwrap().text, "second?");
        assert!(log.question_for(0).is_none());
        assert_eq!(log.question_for(99).unwrap().text, "second?");
    }
}
