//! Import command - merge a previously exported JSON document
//!
//! Runs through the same lenient merge as cloud payloads: the schema
//! version is a hard gate, mistyped fields are skipped and reported, and
//! the sync metadata record is deliberately left untouched so conflict
//! detection still sees the last real sync.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mizan_core::domain::snapshot::ApplyOutcome;

use crate::context::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Source file (a previous `mizan export`)
    pub path: PathBuf,
}

impl ImportCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let value: serde_json::Value = match serde_json::from_slice(&raw) {
            Ok(value) => value,
            Err(err) => {
                formatter.error(&format!("Not a valid JSON document: {err}"));
                return Ok(());
            }
        };

        let outcome = {
            let mut ledger = ctx.ledger.lock().await;
            ledger.apply_value(&value)
        };

        match outcome {
            ApplyOutcome::Rejected { reason } => {
                formatter.error(&format!("Import rejected: {reason}"));
                return Ok(());
            }
            ApplyOutcome::PartiallyApplied { skipped } => {
                formatter.warn(&format!(
                    "Imported with {} skipped field(s): {}",
                    skipped.len(),
                    skipped.join(", ")
                ));
            }
            ApplyOutcome::Applied => formatter.success("Imported"),
        }

        ctx.sync_after_edit(formatter.as_ref()).await
    }
}
