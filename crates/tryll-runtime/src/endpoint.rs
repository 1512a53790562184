//! URL derivation for the stream transport and the HTTP side-channel.

use crate::{Error, Result};
use tryll_types::ServerConfig;

/// Split an `http(s)://host[:port]/...` URL into `(secure, authority)`
pub fn origin(base_url: &str) -> Result<(bool, &str)> {
    let (secure, rest) = if let Some(rest) = base_url.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        (false, rest)
    } else {
        return Err(Error::Config(format!(
            "base_url must start with http:// or https://: {}",
            base_url
        )));
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(Error::Config(format!("base_url has no host: {}", base_url)));
    }
    Ok((secure, authority))
}

/// Transport URL for one connect attempt.
///
/// A tunnel advertised by the server wins: its scheme is mapped to the
/// websocket equivalent and `/ws` appended. Otherwise the local proxy path is
/// joined onto the base URL's origin.
pub fn stream_url(base_url: &str, proxy_ws_path: &str, config: &ServerConfig) -> Result<String> {
    if let Some(tunnel) = config.tunnel() {
        let tunnel = tunnel.trim_end_matches('/');
        let mapped = if let Some(rest) = tunnel.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = tunnel.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            tunnel.to_string()
        };
        return Ok(format!("{}/ws", mapped));
    }

    let (secure, authority) = origin(base_url)?;
    let scheme = if secure { "wss" } else { "ws" };
    Ok(format!("{}://{}{}", scheme, authority, proxy_ws_path))
}

/// Side-channel endpoint relative to the base URL, e.g. `api_url(base, "config")`
pub fn api_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
