//! Payment command - tracked disbursement rows

use anyhow::Result;
use clap::Subcommand;

use mizan_core::domain::ledger::{PaymentCategory, PaymentUpdate};
use mizan_core::domain::newtypes::PaymentId;

use crate::context::AppContext;
use crate::output::{format_amount, get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    /// Add blank payment rows
    Add {
        /// How many rows to add
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// List payment rows
    List,
    /// Update a payment row
    Set {
        id: PaymentId,
        /// ISO date, e.g. 2026-03-01
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        recipient: Option<String>,
        /// Category key (faqir, miskin, amil, muallaf, gharim,
        /// sabilillah, ibnsabil, org, other)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a payment row
    Rm { id: PaymentId },
    /// Delete all payment rows
    Clear,
}

impl PaymentCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        match self {
            PaymentCommand::List => {
                let ledger = ctx.ledger.lock().await;
                let payments = &ledger.tracker().payments;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::json!(payments));
                } else if payments.is_empty() {
                    formatter.info("No payments recorded");
                } else {
                    for p in payments {
                        println!(
                            "{}  {:<10} {:<20} {:<12} {:>14}  {}",
                            p.id,
                            p.date,
                            p.recipient,
                            p.category,
                            format_amount(p.amount),
                            p.notes
                        );
                    }
                    println!("Total paid: {}", format_amount(ledger.total_paid()));
                }
                Ok(())
            }
            PaymentCommand::Add { count } => {
                let ids = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.add_payments(*count)
                };
                for id in &ids {
                    formatter.success(&format!("Added payment {id}"));
                }
                ctx.sync_after_edit(formatter.as_ref()).await
            }
            PaymentCommand::Set {
                id,
                date,
                recipient,
                category,
                amount,
                notes,
            } => {
                if let Some(category) = category {
                    // Empty clears the category; anything else must be valid.
                    if !category.is_empty() && PaymentCategory::from_key(category).is_err() {
                        formatter.error(&format!(
                            "Unknown category '{category}'; valid keys: {}",
                            PaymentCategory::ALL
                                .iter()
                                .map(|c| c.as_key())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ));
                        return Ok(());
                    }
                }

                let updated = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.update_payment(
                        id,
                        PaymentUpdate {
                            date: date.clone(),
                            recipient: recipient.clone(),
                            category: category.clone(),
                            amount: *amount,
                            notes: notes.clone(),
                        },
                    )
                };
                if !updated {
                    formatter.error(&format!("No payment with id {id}"));
                    return Ok(());
                }
                ctx.sync_after_edit(formatter.as_ref()).await
            }
            PaymentCommand::Rm { id } => {
                let removed = {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.delete_payment(id)
                };
                if !removed {
                    formatter.error(&format!("No payment with id {id}"));
                    return Ok(());
                }
                formatter.success("Payment removed");
                ctx.sync_after_edit(formatter.as_ref()).await
            }
            PaymentCommand::Clear => {
                {
                    let mut ledger = ctx.ledger.lock().await;
                    ledger.clear_payments();
                }
                formatter.success("All payments cleared");
                ctx.sync_after_edit(formatter.as_ref()).await
            }
        }
    }
}
