//! Set command - update prices, assets and deductions

use anyhow::Result;
use clap::Subcommand;

use mizan_core::domain::ledger::{AssetField, DeductionField};

use crate::context::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Set a metal price per gram (`gold` or `silver`)
    Price {
        /// Metal: gold (24k reference price) or silver
        metal: String,
        /// Price per gram
        value: f64,
    },
    /// Set a declared asset value
    ///
    /// Fields: gold24g, gold21g, gold18g, silverg (grams);
    /// cash, inventory, receivables, investments, other (currency)
    Asset {
        field: AssetField,
        value: f64,
    },
    /// Set a deduction value (`debts` or `liabilities`)
    Deduction {
        field: DeductionField,
        value: f64,
    },
    /// Reset all calculator inputs to defaults
    Reset,
}

impl SetCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        {
            let mut ledger = ctx.ledger.lock().await;
            match self {
                SetCommand::Price { metal, value } => match metal.as_str() {
                    "gold" => ledger.set_gold_price(*value),
                    "silver" => ledger.set_silver_price(*value),
                    other => {
                        formatter.error(&format!("Unknown metal '{other}' (use gold or silver)"));
                        return Ok(());
                    }
                },
                SetCommand::Asset { field, value } => ledger.set_asset(*field, *value),
                SetCommand::Deduction { field, value } => ledger.set_deduction(*field, *value),
                SetCommand::Reset => ledger.reset_calculator(),
            }
        }

        ctx.sync_after_edit(formatter.as_ref()).await
    }
}
