use super::chunks::ChunkListView;
use super::config::ConfigView;
use owo_colors::OwoColorize;
use std::fmt::Write;
use tryll_runtime::WidgetEvent;
use tryll_types::{ConnectionStatus, Turn};

/// Stateful renderer for the chat transcript.
///
/// Tokens are written inline as they arrive; the completed turn then only
/// needs its footer. A turn that was never streamed (full message) is
/// written whole.
#[derive(Debug, Default)]
pub struct ChatTranscript {
    /// Accumulated text already written for the active stream
    streamed: Option<String>,
    last_answer: Option<usize>,
    echo_user: bool,
}

impl ChatTranscript {
    /// `echo_user` repeats user turns, for input that is not typed at a terminal
    pub fn new(echo_user: bool) -> Self {
        Self {
            echo_user,
            ..Self::default()
        }
    }

    /// Log index of the latest assistant answer
    pub fn last_answer(&self) -> Option<usize> {
        self.last_answer
    }

    pub fn render(&mut self, event: &WidgetEvent) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_event(&mut out, event);
        out
    }

    fn write_event(&mut self, out: &mut String, event: &WidgetEvent) -> std::fmt::Result {
        match event {
            WidgetEvent::StatusChanged(status) => {
                self.break_stream(out)?;
                writeln!(out, "{}", status_line(*status))?;
            }
            WidgetEvent::ServerUnavailable { reason } => {
                writeln!(out, "{} {}", "Server unavailable:".red(), reason)?;
            }
            WidgetEvent::ConnectionError(message) => {
                writeln!(out, "{} {}", "Connection error:".yellow(), message)?;
            }
            WidgetEvent::UserTurn { turn, .. } => {
                if self.echo_user {
                    writeln!(out, "{} {}", "you>".green().bold(), turn.text)?;
                }
            }
            WidgetEvent::StreamStarted => {
                self.break_stream(out)?;
                write!(out, "{} ", "tryll>".cyan().bold())?;
                self.streamed = Some(String::new());
            }
            WidgetEvent::Token { token, text } => {
                if let Some(streamed) = self.streamed.as_mut() {
                    write!(out, "{}", token)?;
                    *streamed = text.clone();
                }
            }
            WidgetEvent::TurnCompleted { index, turn } => {
                match self.streamed.take() {
                    Some(streamed) if streamed == turn.text => writeln!(out)?,
                    Some(_) => {
                        // Full message arrived mid-stream; keep the stream's line intact
                        writeln!(out)?;
                        writeln!(out, "{} {}", "tryll>".cyan().bold(), turn.text)?;
                    }
                    None => writeln!(out, "{} {}", "tryll>".cyan().bold(), turn.text)?,
                }
                write_footer(out, *index, turn)?;
                self.last_answer = Some(*index);
            }
            WidgetEvent::StreamDiscarded => {
                if self.streamed.take().is_some() {
                    writeln!(out)?;
                    writeln!(out, "{}", "(answer interrupted)".dimmed())?;
                }
            }
            WidgetEvent::ProcessingChanged(_) => {}
            WidgetEvent::ModelsAvailable(models) => {
                let names: Vec<String> = models
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect();
                writeln!(out, "{} {}", "models:".dimmed(), names.join(", "))?;
            }
            WidgetEvent::DataSource(source) => {
                writeln!(out, "{} {}", "source:".dimmed(), source)?;
            }
            WidgetEvent::SendRejected { reason } => {
                writeln!(out, "{} {}", "Not sent:".yellow(), reason)?;
            }
            WidgetEvent::ChunkDetails(chunks) => {
                write!(out, "{}", ChunkListView::new(chunks))?;
            }
            WidgetEvent::ChunkDetailsEmpty => {
                writeln!(out, "No RAG chunks for this response")?;
            }
            WidgetEvent::ChunkDetailsFailed(_) => {
                writeln!(out, "{}", "Failed to load chunk details".red())?;
            }
            WidgetEvent::ConfigLoaded { config, connected } => {
                write!(out, "{}", ConfigView::new(config, None, Some(*connected)))?;
            }
            WidgetEvent::ConfigFailed(reason) => {
                writeln!(out, "{} {}", "Failed to load config:".red(), reason)?;
            }
            WidgetEvent::QuickFeedbackSent { turn_index, positive } => {
                let verdict = if *positive { "helpful" } else { "not helpful" };
                writeln!(out, "{}", format!("Marked #{} as {}", turn_index, verdict).dimmed())?;
            }
            WidgetEvent::FeedbackFormOpened => {
                writeln!(
                    out,
                    "Describe the problem: /feedback WHAT WAS WRONG | BETTER ANSWER (optional)"
                )?;
            }
            WidgetEvent::FeedbackRejected(reason) => {
                writeln!(out, "{} {}", "Feedback not sent:".yellow(), reason)?;
            }
            WidgetEvent::FeedbackSubmitted => {
                writeln!(out, "{}", "Thank you for your feedback!".green())?;
            }
            WidgetEvent::FeedbackFailed(reason) => {
                writeln!(out, "{} {}", "Failed to send feedback:".red(), reason)?;
            }
        }
        Ok(())
    }

    /// Terminate a half-written streamed line before printing anything else
    fn break_stream(&mut self, out: &mut String) -> std::fmt::Result {
        if self.streamed.as_deref().is_some_and(|s| !s.is_empty()) {
            writeln!(out)?;
            self.streamed = Some(String::new());
        }
        Ok(())
    }
}

fn status_line(status: ConnectionStatus) -> String {
    let label = match status {
        ConnectionStatus::Connected => "Connected".green().to_string(),
        ConnectionStatus::Connecting => "Connecting...".yellow().to_string(),
        ConnectionStatus::Reconnecting => "Disconnected, reconnecting...".yellow().to_string(),
        ConnectionStatus::Disconnected => "Disconnected".red().to_string(),
    };
    format!("{} {}", "●".dimmed(), label)
}

fn write_footer(out: &mut String, index: usize, turn: &Turn) -> std::fmt::Result {
    let mut footer = format!("  #{}", index);
    if !turn.rag_chunk_ids.is_empty() {
        footer.push_str(&format!(
            " · {} source(s): {} · /chunks",
            turn.rag_chunk_ids.len(),
            turn.rag_chunk_ids.join(", ")
        ));
    }
    footer.push_str(&format!(" · /good {} /bad {}", index, index));
    writeln!(out, "{}", footer.dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn token(token: &str, text: &str) -> WidgetEvent {
        WidgetEvent::Token {
            token: token.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_streamed_turn_is_not_repeated() {
        let mut transcript = ChatTranscript::new(false);
        let mut out = String::new();

        out.push_str(&transcript.render(&WidgetEvent::StreamStarted));
        out.push_str(&transcript.render(&token("Mana ", "Mana ")));
        out.push_str(&transcript.render(&token("flows", "Mana flows")));
        out.push_str(&transcript.render(&WidgetEvent::TurnCompleted {
            index: 1,
            turn: Turn::assistant("Mana flows", vec!["c1".to_string()], Utc::now()),
        }));

        assert_eq!(out.matches("Mana flows").count(), 1);
        assert!(out.contains("#1"));
        assert!(out.contains("c1"));
        assert_eq!(transcript.last_answer(), Some(1));
    }

    #[test]
    fn test_full_message_is_written_whole() {
        let mut transcript = ChatTranscript::new(false);
        let out = transcript.render(&WidgetEvent::TurnCompleted {
            index: 3,
            turn: Turn::assistant("Hello there", Vec::new(), Utc::now()),
        });

        assert!(out.contains("Hello there"));
        assert!(!out.contains("source(s)"));
        assert_eq!(transcript.last_answer(), Some(3));
    }

    #[test]
    fn test_user_turn_echo_is_optional() {
        let event = WidgetEvent::UserTurn {
            index: 0,
            turn: Turn::user("hi", Utc::now()),
        };

        assert!(ChatTranscript::new(false).render(&event).is_empty());
        assert!(ChatTranscript::new(true).render(&event).contains("hi"));
    }

    #[test]
    fn test_interrupted_stream() {
        let mut transcript = ChatTranscript::new(false);
        transcript.render(&WidgetEvent::StreamStarted);
        transcript.render(&token("half", "half"));

        let out = transcript.render(&WidgetEvent::StreamDiscarded);
        assert!(out.contains("interrupted"));
        assert!(transcript.render(&WidgetEvent::StreamDiscarded).is_empty());
    }
}
