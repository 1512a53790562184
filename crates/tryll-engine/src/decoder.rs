use crate::error::DecodeError;
use serde_json::Value;
use tracing::warn;
use tryll_types::ServerEvent;

const SEPARATOR: char = ',';

/// Decode one raw transport frame into server events, in frame order.
///
/// The frame is a run of JSON objects each followed by a comma, without an
/// enclosing array. Exactly one trailing separator is stripped, the rest is
/// wrapped in brackets and parsed as an array. Invalid JSON fails the whole
/// frame; an object whose known key has an unexpected body is logged and
/// skipped while the rest of the frame still applies.
pub fn decode_frame(raw: &str) -> Result<Vec<ServerEvent>, DecodeError> {
    let trimmed = raw.trim();
    let body = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);

    let wrapped = format!("[{}]", body);
    let values: Vec<Value> =
        serde_json::from_str(&wrapped).map_err(|e| DecodeError::syntax(raw, e))?;

    let mut events = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        match ServerEvent::classify(value) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(err) => warn!(position, error = %err, "skipping malformed frame object"),
        }
    }

    Ok(events)
}
