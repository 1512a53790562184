use crate::input::{HELP, Input, SlashCommand, parse_input};
use crate::presentation::ChatTranscript;
use crate::types::OutputFormat;
use anyhow::{Context, Result, bail};
use is_terminal::IsTerminal;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tryll_runtime::{ChatWidget, ClientSettings, WidgetEvent, WidgetHandle};
use tryll_types::ConnectionStatus;

enum Flow {
    Continue,
    /// A message went out; piped input waits for its answer
    Sent,
    Quit,
}

/// Interactive chat session.
///
/// Typed input is read as soon as it arrives. Piped input is fed one message
/// at a time, each after the previous answer completes, and the session ends
/// at end of input.
pub async fn handle(settings: &ClientSettings, format: OutputFormat) -> Result<()> {
    let (widget, mut events) = ChatWidget::spawn_default(settings)?;
    let interactive = std::io::stdin().is_terminal();
    let mut transcript = ChatTranscript::new(!interactive);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut connected = false;
    let mut awaiting_reply = false;

    if interactive && format == OutputFormat::Plain {
        eprintln!("Chatting with {} (type /help for commands)", settings.base_url);
    }
    widget.open();

    loop {
        let accept_input = interactive || (connected && !awaiting_reply);

        tokio::select! {
            line = lines.next_line(), if accept_input => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match dispatch(&widget, &transcript, &line, format) {
                    Flow::Continue => {}
                    Flow::Sent => awaiting_reply = !interactive,
                    Flow::Quit => break,
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };

                match &event {
                    WidgetEvent::StatusChanged(status) => {
                        connected = status.is_connected();
                        if !interactive && *status == ConnectionStatus::Disconnected {
                            emit(&mut transcript, &event, format)?;
                            bail!("Connection to {} closed", settings.base_url);
                        }
                    }
                    WidgetEvent::ProcessingChanged(false) | WidgetEvent::SendRejected { .. } => {
                        awaiting_reply = false;
                    }
                    _ => {}
                }

                emit(&mut transcript, &event, format)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    widget.close();
    Ok(())
}

fn emit(transcript: &mut ChatTranscript, event: &WidgetEvent, format: OutputFormat) -> Result<()> {
    let mut stdout = std::io::stdout();
    match format {
        OutputFormat::Json => {
            // Keep the transcript's answer tracking current for /good and /bad
            transcript.render(event);
            writeln!(stdout, "{}", serde_json::to_string(event)?)?;
        }
        OutputFormat::Plain => write!(stdout, "{}", transcript.render(event))?,
    }
    stdout.flush()?;
    Ok(())
}

fn dispatch(
    widget: &WidgetHandle,
    transcript: &ChatTranscript,
    line: &str,
    format: OutputFormat,
) -> Flow {
    match parse_input(line) {
        Input::Empty => {}
        Input::Message(text) => {
            widget.send(text);
            return Flow::Sent;
        }
        Input::Invalid(hint) => eprintln!("{}", hint),
        Input::Command(command) => match command {
            SlashCommand::Chunks => widget.show_chunk_details(),
            SlashCommand::Config => widget.show_config(),
            SlashCommand::Rate { turn, positive } => {
                match turn.or_else(|| transcript.last_answer()) {
                    Some(index) => widget.submit_quick_feedback(index, positive),
                    None => eprintln!("No answer to rate yet"),
                }
            }
            SlashCommand::Feedback(None) => widget.open_feedback_form(),
            SlashCommand::Feedback(Some(feedback)) => {
                widget.submit_detailed_feedback(feedback.text, feedback.suggestion)
            }
            SlashCommand::Open => widget.open(),
            SlashCommand::Close => widget.close(),
            SlashCommand::Quit => return Flow::Quit,
            SlashCommand::Help => match format {
                OutputFormat::Plain => println!("{}", HELP),
                OutputFormat::Json => eprintln!("{}", HELP),
            },
        },
    }
    Flow::Continue
}
