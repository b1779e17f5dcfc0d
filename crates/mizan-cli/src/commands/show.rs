//! Show command - calculator summary and tracker progress

use anyhow::Result;
use clap::Args;

use crate::context::AppContext;
use crate::output::{format_amount, get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ShowCommand {}

impl ShowCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;
        let ledger = ctx.ledger.lock().await;

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::json!({
                "gross_assets": ledger.gross_assets(),
                "total_deductions": ledger.total_deductions(),
                "net_wealth": ledger.net_wealth(),
                "nisab_gold": ledger.nisab_gold(),
                "nisab_silver": ledger.nisab_silver(),
                "nisab_threshold": ledger.nisab_threshold(),
                "nisab_met": ledger.nisab_met(),
                "zakat_due": ledger.zakat_due(),
                "total_paid": ledger.total_paid(),
                "remaining": ledger.remaining(),
                "progress_percent": ledger.progress_percent(),
                "payments": ledger.tracker().payments.len(),
            });
            formatter.print_json(&json);
            return Ok(());
        }

        println!("Wealth");
        println!("  Gross assets      {}", format_amount(ledger.gross_assets()));
        println!(
            "  Deductions        {}",
            format_amount(ledger.total_deductions())
        );
        println!("  Net wealth        {}", format_amount(ledger.net_wealth()));
        println!();
        println!("Nisab");
        println!("  Gold threshold    {}", format_amount(ledger.nisab_gold()));
        println!(
            "  Silver threshold  {}",
            format_amount(ledger.nisab_silver())
        );
        println!(
            "  Binding threshold {} ({})",
            format_amount(ledger.nisab_threshold()),
            if ledger.nisab_met() { "met" } else { "not met" }
        );
        println!();
        println!("Obligation");
        println!("  Zakat due         {}", format_amount(ledger.zakat_due()));
        println!("  Paid so far       {}", format_amount(ledger.total_paid()));
        println!("  Remaining         {}", format_amount(ledger.remaining()));
        println!(
            "  Progress          {:.1}%{}",
            ledger.progress_percent(),
            if ledger.is_complete() {
                " - complete"
            } else {
                ""
            }
        );

        Ok(())
    }
}
