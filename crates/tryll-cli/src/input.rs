//! Parsing of lines typed into `tryll chat`.

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    Command(SlashCommand),
    /// Slash command that could not be parsed; carries a hint for the user
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Chunks,
    Config,
    /// `/good [N]` or `/bad [N]`; without N the latest answer is rated
    Rate { turn: Option<usize>, positive: bool },
    /// `/feedback` opens the form; `/feedback text | suggestion` submits it
    Feedback(Option<DetailedFeedback>),
    Open,
    Close,
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedFeedback {
    pub text: String,
    pub suggestion: String,
}

pub const HELP: &str = "\
Commands:
  /chunks              Show the sources behind the latest answer
  /config              Show the server configuration
  /good [N]            Rate answer #N (default: latest) as helpful
  /bad [N]             Rate answer #N (default: latest) as unhelpful
  /feedback            Start a detailed report on the latest answer
  /feedback TEXT | SUGGESTION
                       Send a detailed report (suggestion is optional)
  /open, /close        Reconnect, or stop reconnecting
  /quit                Leave the chat
Anything else is sent as a message. Start a line with // to send a leading slash.";

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    if let Some(escaped) = line.strip_prefix("//") {
        return Input::Message(format!("/{}", escaped));
    }

    let Some(command_line) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, rest) = match command_line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command_line, ""),
    };

    let command = match name {
        "chunks" | "sources" => SlashCommand::Chunks,
        "config" => SlashCommand::Config,
        "good" | "bad" => {
            let turn = if rest.is_empty() {
                None
            } else {
                match rest.parse::<usize>() {
                    Ok(turn) => Some(turn),
                    Err(_) => {
                        return Input::Invalid(format!(
                            "Expected an answer number, e.g. /{} 3",
                            name
                        ));
                    }
                }
            };
            SlashCommand::Rate {
                turn,
                positive: name == "good",
            }
        }
        "feedback" => {
            if rest.is_empty() {
                SlashCommand::Feedback(None)
            } else {
                let (text, suggestion) = rest.split_once('|').unwrap_or((rest, ""));
                SlashCommand::Feedback(Some(DetailedFeedback {
                    text: text.trim().to_string(),
                    suggestion: suggestion.trim().to_string(),
                }))
            }
        }
        "open" => SlashCommand::Open,
        "close" => SlashCommand::Close,
        "quit" | "exit" => SlashCommand::Quit,
        "help" | "?" => SlashCommand::Help,
        other => {
            return Input::Invalid(format!("Unknown command /{} (try /help)", other));
        }
    };

    Input::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_is_trimmed() {
        assert_eq!(
            parse_input("  What is mana?  "),
            Input::Message("What is mana?".to_string())
        );
        assert_eq!(parse_input("   "), Input::Empty);
    }

    #[test]
    fn test_rate_with_and_without_number() {
        assert_eq!(
            parse_input("/good"),
            Input::Command(SlashCommand::Rate {
                turn: None,
                positive: true
            })
        );
        assert_eq!(
            parse_input("/bad 3"),
            Input::Command(SlashCommand::Rate {
                turn: Some(3),
                positive: false
            })
        );
        assert!(matches!(parse_input("/good three"), Input::Invalid(_)));
    }

    #[test]
    fn test_feedback_forms() {
        assert_eq!(
            parse_input("/feedback"),
            Input::Command(SlashCommand::Feedback(None))
        );
        assert_eq!(
            parse_input("/feedback Too vague | Mana is energy"),
            Input::Command(SlashCommand::Feedback(Some(DetailedFeedback {
                text: "Too vague".to_string(),
                suggestion: "Mana is energy".to_string(),
            })))
        );
        assert_eq!(
            parse_input("/feedback Wrong city"),
            Input::Command(SlashCommand::Feedback(Some(DetailedFeedback {
                text: "Wrong city".to_string(),
                suggestion: String::new(),
            })))
        );
    }

    #[test]
    fn test_escaped_slash_is_a_message() {
        assert_eq!(
            parse_input("//etc/hosts"),
            Input::Message("/etc/hosts".to_string())
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_input("/teleport"),
            Input::Invalid("Unknown command /teleport (try /help)".to_string())
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_input("/quit"), Input::Command(SlashCommand::Quit));
        assert_eq!(parse_input("/chunks"), Input::Command(SlashCommand::Chunks));
        assert_eq!(parse_input("/config"), Input::Command(SlashCommand::Config));
        assert_eq!(parse_input("/open"), Input::Command(SlashCommand::Open));
        assert_eq!(parse_input("/close"), Input::Command(SlashCommand::Close));
        assert_eq!(parse_input("/help"), Input::Command(SlashCommand::Help));
    }
}
