use crate::presentation::ChunkListView;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use tryll_runtime::{ChatApi, ClientSettings, HttpChatApi};

pub async fn handle(settings: &ClientSettings, ids: Vec<String>, format: OutputFormat) -> Result<()> {
    let api = HttpChatApi::new(&settings.base_url, settings.request_timeout())?;
    let chunks = api
        .fetch_chunks(ids)
        .await
        .context("Failed to load chunk details")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chunks)?),
        OutputFormat::Plain => print!("{}", ChunkListView::new(&chunks).with_full_text()),
    }
    Ok(())
}
