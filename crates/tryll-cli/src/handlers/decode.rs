use crate::presentation::{DecodeReport, DecodeReportView, FrameOutcome};
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Read;
use std::path::Path;
use tryll_engine::SessionMachine;

/// Replay captured frames, one per line, through a fresh session
pub fn handle(file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read frames from stdin")?;
            buf
        }
    };

    let report = replay(&input);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print!("{}", DecodeReportView::new(&report)),
    }
    Ok(())
}

fn replay(input: &str) -> DecodeReport {
    let mut machine = SessionMachine::new();
    let mut report = DecodeReport::default();

    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match machine.apply_frame(line, Utc::now()) {
            Ok(updates) => FrameOutcome::applied(number + 1, &updates),
            Err(err) => {
                tracing::debug!(line = number + 1, error = %err, "frame dropped");
                FrameOutcome::Dropped {
                    line: number + 1,
                    error: err.to_string(),
                }
            }
        };
        report.frames.push(outcome);
    }

    report.turns = machine.log().turns().to_vec();
    report
}
