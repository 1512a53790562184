use crate::presentation::{InitOutcome, InitView};
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use tryll_runtime::{ClientSettings, resolve_config_path};

pub fn handle(config_path: Option<&str>, force: bool, format: OutputFormat) -> Result<()> {
    let path = resolve_config_path(config_path).context("Failed to resolve settings path")?;

    let written = if path.exists() && !force {
        false
    } else {
        ClientSettings::default()
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        true
    };

    let outcome = InitOutcome { path, written };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Plain => print!("{}", InitView::new(&outcome)),
    }
    Ok(())
}
