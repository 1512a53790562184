use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt;
use tryll_engine::SessionUpdate;
use tryll_types::Turn;

use super::text::truncate;

/// Result of replaying captured frames through a fresh session
#[derive(Debug, Default, Serialize)]
pub struct DecodeReport {
    pub frames: Vec<FrameOutcome>,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    Applied { line: usize, updates: Vec<String> },
    Dropped { line: usize, error: String },
}

impl FrameOutcome {
    pub fn applied(line: usize, updates: &[SessionUpdate]) -> Self {
        FrameOutcome::Applied {
            line,
            updates: updates.iter().map(describe_update).collect(),
        }
    }
}

pub fn describe_update(update: &SessionUpdate) -> String {
    match update {
        SessionUpdate::ServerReady => "server ready".to_string(),
        SessionUpdate::ModelsAvailable(models) => format!("{} model(s) available", models.len()),
        SessionUpdate::AgentAssigned(id) => format!("agent id {}", id),
        SessionUpdate::StreamStarted => "stream started".to_string(),
        SessionUpdate::Token { token, .. } => format!("token {:?}", token),
        SessionUpdate::TurnCompleted { index, turn } => {
            format!("{} turn #{} completed", turn.role.as_str(), index)
        }
        SessionUpdate::StreamDiscarded => "stream discarded".to_string(),
        SessionUpdate::ProcessingChanged(true) => "processing".to_string(),
        SessionUpdate::ProcessingChanged(false) => "idle".to_string(),
        SessionUpdate::DataSource(text) => format!("data source {:?}", truncate(text, 60)),
        SessionUpdate::ProtocolViolation(err) => format!("ignored: {}", err),
    }
}

pub struct DecodeReportView<'a> {
    data: &'a DecodeReport,
}

impl<'a> DecodeReportView<'a> {
    pub fn new(data: &'a DecodeReport) -> Self {
        Self { data }
    }
}

impl fmt::Display for DecodeReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.data.frames {
            match frame {
                FrameOutcome::Applied { line, updates } if updates.is_empty() => {
                    writeln!(f, "{:>4}  {}", line, "(no effect)".dimmed())?;
                }
                FrameOutcome::Applied { line, updates } => {
                    writeln!(f, "{:>4}  {}", line, updates.join(", "))?;
                }
                FrameOutcome::Dropped { line, error } => {
                    writeln!(f, "{:>4}  {} {}", line, "dropped:".red(), error)?;
                }
            }
        }

        writeln!(f, "\nConversation ({} turns):", self.data.turns.len())?;
        for (index, turn) in self.data.turns.iter().enumerate() {
            writeln!(f, "  #{} {:<9} {}", index, turn.role.as_str(), turn.text)?;
            if !turn.rag_chunk_ids.is_empty() {
                writeln!(f, "     {} {}", "chunks:".dimmed(), turn.rag_chunk_ids.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_updates() {
        assert_eq!(describe_update(&SessionUpdate::ServerReady), "server ready");
        assert_eq!(describe_update(&SessionUpdate::AgentAssigned(42)), "agent id 42");
        assert_eq!(
            describe_update(&SessionUpdate::Token {
                token: "Mana".to_string(),
                text: "Mana".to_string()
            }),
            "token \"Mana\""
        );
    }
}
