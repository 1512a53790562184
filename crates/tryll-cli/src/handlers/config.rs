use crate::presentation::ConfigView;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use tryll_runtime::endpoint::stream_url;
use tryll_runtime::{ChatApi, ClientSettings, HttpChatApi};

pub async fn handle(settings: &ClientSettings, format: OutputFormat) -> Result<()> {
    let api = HttpChatApi::new(&settings.base_url, settings.request_timeout())?;
    let config = api
        .fetch_config()
        .await
        .with_context(|| format!("Server unavailable at {}", settings.base_url))?;

    let url = stream_url(&settings.base_url, &settings.proxy_ws_path, &config)?;

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "config": config, "stream_url": url });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Plain => print!("{}", ConfigView::new(&config, Some(&url), None)),
    }
    Ok(())
}
