use owo_colors::OwoColorize;
use serde_json::Value;
use std::fmt;
use tryll_types::ServerConfig;

/// Server capability snapshot, one `key: value` per line
pub struct ConfigView<'a> {
    config: &'a ServerConfig,
    stream_url: Option<&'a str>,
    connected: Option<bool>,
}

impl<'a> ConfigView<'a> {
    pub fn new(config: &'a ServerConfig, stream_url: Option<&'a str>, connected: Option<bool>) -> Self {
        Self {
            config,
            stream_url,
            connected,
        }
    }
}

fn plain(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

fn or_unset(value: &Option<Value>) -> String {
    value.as_ref().map(plain).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for ConfigView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Server configuration:")?;

        if let Some(connected) = self.connected {
            let status = if connected {
                "connected".green().to_string()
            } else {
                "not connected".red().to_string()
            };
            writeln!(f, "  {:<26} {}", "status", status)?;
        }
        if let Some(url) = self.stream_url {
            writeln!(f, "  {:<26} {}", "stream", url)?;
        }

        let config = self.config;
        writeln!(f, "  {:<26} {}", "tunnel_url", config.tunnel().unwrap_or("-"))?;
        writeln!(f, "  {:<26} {}", "rag_chunks_number", or_unset(&config.rag_chunks_number))?;
        writeln!(f, "  {:<26} {}", "rag_score_threshold", or_unset(&config.rag_score_threshold))?;
        writeln!(f, "  {:<26} {}", "rag_double_tower", or_unset(&config.rag_double_tower))?;
        writeln!(f, "  {:<26} {}", "embedding_model_name", or_unset(&config.embedding_model_name))?;
        writeln!(
            f,
            "  {:<26} {}",
            "semantic_filter_threshold",
            or_unset(&config.semantic_filter_threshold)
        )?;

        let mut extra: Vec<_> = config.extra.iter().collect();
        extra.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in extra {
            writeln!(f, "  {:<26} {}", key, plain(value))?;
        }
        Ok(())
    }
}
