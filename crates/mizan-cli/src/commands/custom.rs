//! Custom command - user-defined asset rows

use anyhow::Result;
use clap::Subcommand;

use mizan_core::domain::newtypes::CustomAssetId;

use crate::context::AppContext;
use crate::output::{format_amount, get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum CustomCommand {
    /// Add a custom asset row
    Add {
        /// Free-form label (e.g. "crypto wallet")
        label: String,
        /// Amount in the working currency
        amount: f64,
    },
    /// List custom asset rows
    List,
    /// Update a custom asset row
    Set {
        id: CustomAssetId,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Remove a custom asset row
    Rm { id: CustomAssetId },
}

impl CustomCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        match self {
            CustomCommand::List => {
                let ledger = ctx.ledger.lock().await;
                let rows = &ledger.calculator().custom_assets;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::json!(rows));
                } else if rows.is_empty() {
                    formatter.info("No custom assets");
                } else {
                    for row in rows {
                        println!(
                            "{}  {:<24} {}",
                            row.id,
                            row.label,
                            format_amount(row.amount)
                        );
                    }
                }
                Ok(())
            }
            CustomCommand::Add { label, amount } => {
                let id = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.add_custom_asset(label.clone(), *amount)
                };
                formatter.success(&format!("Added custom asset {id}"));
                ctx.sync_after_edit(formatter.as_ref()).await
            }
            CustomCommand::Set { id, label, amount } => {
                let updated = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.update_custom_asset(id, label.clone(), *amount)
                };
                if !updated {
                    formatter.error(&format!("No custom asset with id {id}"));
                    return Ok(());
                }
                ctx.sync_after_edit(formatter.as_ref()).await
            }
            CustomCommand::Rm { id } => {
                let removed = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.remove_custom_asset(id)
                };
                if !removed {
                    formatter.error(&format!("No custom asset with id {id}"));
                    return Ok(());
                }
                formatter.success("Custom asset removed");
                ctx.sync_after_edit(formatter.as_ref()).await
            }
        }
    }
}
