//! Export command - write the ledger as a pretty-printed JSON document

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::context::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Destination file
    pub path: PathBuf,
}

impl ExportCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        let document = { ctx.ledger.lock().await.export_document() };
        let json = document
            .to_pretty_json()
            .context("Failed to serialize export document")?;

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        formatter.success(&format!("Exported to {}", self.path.display()));
        Ok(())
    }
}
